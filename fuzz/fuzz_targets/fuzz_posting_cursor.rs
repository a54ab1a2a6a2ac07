#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use termsearch::index::{CachedPosting, DiskPosting, PostingCursor};

#[derive(Arbitrary, Debug)]
enum Step {
    Next,
    Jump(u64),
}

#[derive(Arbitrary, Debug)]
struct Input {
    data: Vec<u8>,
    steps: Vec<Step>,
}

fuzz_target!(|input: Input| {
    let mut disk = DiskPosting::new(1, &input.data, u32::MAX);

    // Valid postings must fork into a snapshot that walks identically
    let Ok(mut cached) = CachedPosting::fork(&disk) else {
        return;
    };

    assert_eq!(disk.start(), cached.start());
    for step in &input.steps {
        match *step {
            Step::Next => assert_eq!(disk.next(), cached.next()),
            Step::Jump(target) => assert_eq!(disk.jump(target), cached.jump(target)),
        }
        assert_eq!(disk.current_id(), cached.current_id());
    }
});
