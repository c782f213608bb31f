#![no_main]

use std::io::{self, Read};

use libfuzzer_sys::fuzz_target;
use rabin_chunker::{ChunkConfig, Chunker};

/// Splits reads at sizes taken from the fuzz input.
struct Jagged<'a> {
    data: &'a [u8],
    steps: &'a [u8],
    turn: usize,
}

impl Read for Jagged<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let step = match self.steps.get(self.turn % self.steps.len().max(1)) {
            Some(&s) => s as usize + 1,
            None => buf.len(),
        };
        self.turn += 1;
        let n = step.min(buf.len()).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

fuzz_target!(|input: (Vec<u8>, Vec<u8>)| {
    let (data, steps) = input;
    let config = ChunkConfig::new(100, 1024).unwrap().with_average_bits(7);
    let chunker = Chunker::new(config).unwrap();

    let expected = chunker.chunk_bytes(data.clone());

    // Read sizes never move boundaries
    let reader = Jagged {
        data: &data,
        steps: &steps,
        turn: 0,
    };
    let streamed: Vec<_> = chunker
        .chunk(reader)
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(streamed, expected);

    // Session copy-out sees the same chunks
    let mut session = chunker.session(&data[..]);
    let mut buf = vec![0u8; config.max_size()];
    for chunk in &expected {
        let n = session.next_into(&mut buf).unwrap();
        assert_eq!(&buf[..n], &chunk.data[..]);
    }
    assert_eq!(session.next_into(&mut buf).unwrap(), 0);
});
