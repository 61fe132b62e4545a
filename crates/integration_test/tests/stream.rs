//! Document streams over real files.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Seek, SeekFrom, Write},
};

use tessera::{Decoder, Encoder, Error};
use tessera_integration_test::{Customer, create_test_registry};

#[test]
fn file_round_trip() {
    let registry = create_test_registry();
    let customers: Vec<_> = (0..25).map(Customer::sample).collect();

    let mut file = tempfile::tempfile().unwrap();
    {
        let mut encoder = Encoder::new(BufWriter::new(&mut file), &registry);
        for customer in &customers {
            encoder.encode(customer).unwrap();
        }
        encoder.flush().unwrap();
    }

    file.seek(SeekFrom::Start(0)).unwrap();
    let mut decoder = Decoder::new(BufReader::new(&mut file), &registry);
    let mut decoded = Vec::new();
    while let Some(customer) = decoder.try_decode::<Customer>().unwrap() {
        decoded.push(customer);
    }

    assert_eq!(decoded, customers);
}

#[test]
fn truncated_file() {
    let registry = create_test_registry();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("customers.bin");

    let mut encoder = Encoder::new(File::create(&path).unwrap(), &registry);
    encoder.encode(&Customer::sample(1)).unwrap();
    encoder.encode(&Customer::sample(2)).unwrap();
    let file = encoder.into_inner();

    let len = file.metadata().unwrap().len();
    file.set_len(len - 10).unwrap();
    drop(file);

    let mut decoder = Decoder::new(File::open(&path).unwrap(), &registry);
    assert_eq!(decoder.decode::<Customer>().unwrap(), Customer::sample(1));
    assert!(matches!(decoder.try_decode::<Customer>(), Err(Error::Io(_))));
}

#[test]
fn appending_to_an_existing_stream() {
    let registry = create_test_registry();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log.bin");

    for id in 0..3 {
        let file =
            File::options().create(true).append(true).open(&path).unwrap();
        let mut encoder = Encoder::new(file, &registry);
        encoder.encode(&Customer::sample(id)).unwrap();
        encoder.get_mut().flush().unwrap();
    }

    let mut decoder = Decoder::new(File::open(&path).unwrap(), &registry);
    for id in 0..3 {
        assert_eq!(decoder.decode::<Customer>().unwrap().id, id);
    }
    assert!(decoder.try_decode::<Customer>().unwrap().is_none());
}
