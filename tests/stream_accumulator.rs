// tests/stream_accumulator.rs

use proptest::prelude::*;
use sketchbridge::exec::{BannerFilter, ChunkDecoder, StreamAccumulator};
use sketchbridge::types::MonitorMethod;

#[test]
fn banner_chunk_is_dropped_whole() {
    let filter = BannerFilter::standard();
    let acc = StreamAccumulator::fold_stdout(
        [
            "Monitor port settings:\nbaudrate=9600\n",
            "Connecting to /dev/ttyUSB0. Press CTRL-C to exit.\n",
            "\r\n",
            "temp=21\n",
        ],
        &filter,
    );

    assert_eq!(acc.stdout(), "temp=21\n");
    assert!(acc.useful_data_seen());
}

#[test]
fn disabled_filter_keeps_everything() {
    let acc = StreamAccumulator::fold_stdout(
        ["Connecting to COM3\n", "\n", "x\n"],
        &BannerFilter::disabled(),
    );

    assert_eq!(acc.stdout(), "Connecting to COM3\n\nx\n");
    assert!(acc.useful_data_seen());
}

#[test]
fn whitespace_alone_is_not_useful_data() {
    let acc = StreamAccumulator::fold_stdout(["  \n", "\t"], &BannerFilter::disabled());

    assert!(!acc.useful_data_seen());
    let result = acc.into_result(MonitorMethod::Direct, 9600, 5);
    assert!(!result.success);
    assert_eq!(
        result.error_message.as_deref(),
        Some("No data via direct spawn method at 9600 baud in 5s")
    );
}

#[test]
fn custom_banner_set_is_respected() {
    let filter = BannerFilter::new(vec!["BOOT".to_string()], true);
    let acc = StreamAccumulator::fold_stdout(["BOOT v1.2\n", "Connecting to x\n"], &filter);

    assert_eq!(acc.stdout(), "Connecting to x\n");
}

#[test]
fn stderr_is_never_filtered() {
    let acc = StreamAccumulator::new().absorb_stderr("Connecting to failed\n");
    assert_eq!(acc.stderr(), "Connecting to failed\n");

    let result = acc.into_result(MonitorMethod::Regular, 9600, 5);
    assert!(!result.success);
    assert_eq!(result.stderr, "Connecting to failed");
    assert_eq!(result.error_message.as_deref(), Some("Connecting to failed"));
}

#[test]
fn success_trims_stdout_and_tags_method() {
    let filter = BannerFilter::standard();
    let result = StreamAccumulator::new()
        .absorb_stdout("\n  hello\n", &filter)
        .absorb_stderr("note\n")
        .into_result(MonitorMethod::Regular, 115200, 3);

    assert!(result.success);
    assert_eq!(result.stdout, "hello");
    assert_eq!(result.stderr, "note\n");
    assert_eq!(result.error_message, None);
    assert_eq!(result.method, Some(MonitorMethod::Regular));
}

#[test]
fn decoder_joins_a_character_split_across_reads() {
    let bytes = "°C=21".as_bytes();
    let mut dec = ChunkDecoder::new();

    let first = dec.decode(&bytes[..1]);
    let second = dec.decode(&bytes[1..]);

    assert_eq!(first, "");
    assert_eq!(second, "°C=21");
    assert_eq!(dec.finish(), "");
}

#[test]
fn decoder_replaces_invalid_bytes() {
    let mut dec = ChunkDecoder::new();
    assert_eq!(dec.decode(b"a\xffb"), "a\u{FFFD}b");
}

#[test]
fn decoder_flushes_truncated_tail_on_finish() {
    let mut dec = ChunkDecoder::new();
    assert_eq!(dec.decode(&[b'x', 0xE2, 0x82]), "x");
    assert_eq!(dec.finish(), "\u{FFFD}");
}

#[derive(Debug, Clone)]
enum Chunk {
    Banner(usize),
    Data(String),
    Blank,
}

fn chunk_strategy() -> impl Strategy<Value = Chunk> {
    prop_oneof![
        (0..3usize).prop_map(Chunk::Banner),
        "[a-z0-9=]{1,12}\n".prop_map(Chunk::Data),
        Just(Chunk::Blank),
    ]
}

fn render(chunk: &Chunk) -> String {
    const BANNERS: [&str; 3] = [
        "Monitor port settings:\n",
        "Connecting to /dev/ttyUSB0\n",
        "Press CTRL-C to exit.\n",
    ];
    match chunk {
        Chunk::Banner(i) => BANNERS[*i].to_string(),
        Chunk::Data(s) => s.clone(),
        Chunk::Blank => " \n".to_string(),
    }
}

proptest! {
    #[test]
    fn filtered_output_is_exactly_the_data_chunks(chunks in proptest::collection::vec(chunk_strategy(), 0..20)) {
        let rendered: Vec<String> = chunks.iter().map(render).collect();
        let acc = StreamAccumulator::fold_stdout(
            rendered.iter().map(String::as_str),
            &BannerFilter::standard(),
        );

        let expected: String = chunks
            .iter()
            .filter_map(|c| match c {
                Chunk::Data(s) => Some(s.as_str()),
                _ => None,
            })
            .collect();

        prop_assert_eq!(acc.stdout(), expected.as_str());
        prop_assert_eq!(acc.useful_data_seen(), !expected.is_empty());
        prop_assert!(!acc.stdout().contains("Connecting to"));
    }

    #[test]
    fn unfiltered_output_is_the_concatenation(chunks in proptest::collection::vec(chunk_strategy(), 0..20)) {
        let rendered: Vec<String> = chunks.iter().map(render).collect();
        let acc = StreamAccumulator::fold_stdout(
            rendered.iter().map(String::as_str),
            &BannerFilter::disabled(),
        );

        prop_assert_eq!(acc.stdout(), rendered.concat());
    }
}
