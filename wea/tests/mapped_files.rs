//! Exported segments mapped back from disk

#![cfg(feature = "mmap")]

use ndarray::array;
use wea::{create_exchange_file, open_exchange_file, BufferedExchange, ElementType};

#[test]
fn test_buffered_export_maps_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("matrix.wea");

    let source = array![[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0]];
    let handle = BufferedExchange::from_array(&source).unwrap();
    let file = std::fs::File::create(&path).unwrap();
    handle.write_to(file).unwrap();

    let mapped = open_exchange_file(&path).unwrap();
    assert_eq!(mapped.element_type(), ElementType::Float32);
    assert_eq!(mapped.view::<f32>().unwrap(), source.into_dyn().view());
    assert_eq!(mapped.header_bytes(), handle.header_bytes());
}

#[test]
fn test_mapped_file_reads_as_buffer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counts.wea");

    {
        let mut created = create_exchange_file(&path, ElementType::UInt64, &[2, 2, 2]).unwrap();
        created.view_mut::<u64>().unwrap()[[1, 1, 1]] = 77;
        created.flush().unwrap();
    }

    let bytes = std::fs::read(&path).unwrap();
    let loaded = BufferedExchange::load(&bytes).unwrap();
    assert_eq!(loaded.as_slice::<u64>().unwrap()[7], 77);
}

#[test]
fn test_recreate_truncates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shrink.wea");

    create_exchange_file(&path, ElementType::Float64, &[100]).unwrap();
    create_exchange_file(&path, ElementType::Int8, &[3]).unwrap();

    assert_eq!(std::fs::metadata(&path).unwrap().len(), 131);
    assert_eq!(open_exchange_file(&path).unwrap().shape(), &[3]);
}
