#![no_main]

use libfuzzer_sys::fuzz_target;
use termsearch::index::PostingItem;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must decode or be rejected, never panic
    let mut item = PostingItem::default();
    let mut offset = 0;
    let mut prev = 0;
    while let Some(consumed) = termsearch::utils::decode_posting(&data[offset..], prev, &mut item) {
        assert!(consumed > 0);
        assert!(item.doc_id > prev);
        assert_eq!(item.tf as usize, item.positions.len());
        prev = item.doc_id;
        offset += consumed;
    }

    let _ = termsearch::utils::skip_posting(data, 0);
});
