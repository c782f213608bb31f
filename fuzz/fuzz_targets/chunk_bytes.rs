#![no_main]

use libfuzzer_sys::fuzz_target;
use rabin_chunker::{ChunkConfig, Chunker};

fuzz_target!(|data: Vec<u8>| {
    let configs = [
        // Every byte hashed
        ChunkConfig::new(1, 64).unwrap().with_average_bits(4),
        // Window straddles the min-size skip
        ChunkConfig::new(100, 1024).unwrap().with_average_bits(7),
        ChunkConfig::new(1024, 16 * 1024).unwrap().with_average_bits(11),
        ChunkConfig::default(),
    ];

    for config in configs {
        let chunker = Chunker::new(config).unwrap();
        let chunks = chunker.chunk_bytes(data.clone());

        // Size bounds; only the last chunk may be short
        for (i, chunk) in chunks.iter().enumerate() {
            assert!(!chunk.is_empty());
            assert!(chunk.len() <= config.max_size());
            if i < chunks.len() - 1 {
                assert!(chunk.len() >= config.min_size());
            }
        }

        // Reassembly and offsets
        let mut expected_offset = 0u64;
        let mut joined = Vec::with_capacity(data.len());
        for chunk in &chunks {
            assert_eq!(chunk.offset, expected_offset);
            expected_offset += chunk.len() as u64;
            joined.extend_from_slice(&chunk.data);
        }
        assert_eq!(joined, data);

        // Determinism
        assert_eq!(chunker.chunk_bytes(data.clone()), chunks);
    }
});
