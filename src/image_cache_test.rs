use std::cell::Cell;

use super::*;

fn counting_decoder(count: &Cell<usize>) -> impl FnOnce(&str) -> Result<String, String> + '_ {
    move |source| {
        count.set(count.get() + 1);
        Ok(format!("decoded:{source}"))
    }
}

#[test]
fn new_cache_is_empty() {
    let cache: ImageCache<String> = ImageCache::new();
    assert!(cache.source().is_none());
}

#[test]
fn same_source_decodes_once() {
    let count = Cell::new(0);
    let mut cache = ImageCache::new();
    for _ in 0..5 {
        let value = cache.get_or_decode("data:a", counting_decoder(&count)).unwrap();
        assert_eq!(value, "decoded:data:a");
    }
    assert_eq!(count.get(), 1);
}

#[test]
fn changed_source_invalidates_entry() {
    let count = Cell::new(0);
    let mut cache = ImageCache::new();
    cache.get_or_decode("data:a", counting_decoder(&count)).unwrap();
    let value = cache.get_or_decode("data:b", counting_decoder(&count)).unwrap();
    assert_eq!(value, "decoded:data:b");
    assert_eq!(cache.source(), Some("data:b"));
    assert_eq!(count.get(), 2);
}

#[test]
fn switching_back_decodes_again() {
    let count = Cell::new(0);
    let mut cache = ImageCache::new();
    cache.get_or_decode("data:a", counting_decoder(&count)).unwrap();
    cache.get_or_decode("data:b", counting_decoder(&count)).unwrap();
    cache.get_or_decode("data:a", counting_decoder(&count)).unwrap();
    assert_eq!(count.get(), 3);
}

#[test]
fn decode_error_propagates_and_empties_cache() {
    let mut cache: ImageCache<String> = ImageCache::new();
    cache.get_or_decode("data:a", |s| Ok::<_, String>(s.to_owned())).unwrap();
    let err = cache
        .get_or_decode("data:broken", |_| Err::<String, _>("bad image".to_owned()))
        .unwrap_err();
    assert_eq!(err, "bad image");
    assert!(cache.source().is_none());
}

#[test]
fn clear_forces_redecode() {
    let count = Cell::new(0);
    let mut cache = ImageCache::new();
    cache.get_or_decode("data:a", counting_decoder(&count)).unwrap();
    cache.clear();
    cache.get_or_decode("data:a", counting_decoder(&count)).unwrap();
    assert_eq!(count.get(), 2);
}
