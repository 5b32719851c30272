//! End-to-end decoding of synthetic version 1 symbols.

mod common;

use std::time::Duration;

use camqr::config::PipelineConfig;
use camqr::decoder::{self, DecodeError};
use camqr::engine::{DecoderEngine, QrEngine};
use camqr::models::{DataType, EcLevel, Frame, MaskPattern, PixelFormat};
use camqr::pipeline::{CycleOutcome, PipelineController, Shutdown};
use camqr::sink::{CollectingSink, ReportKind, TextSink};
use camqr::source::{ImageFileSource, frame_channel};
use common::fast_config;
use common::synthetic_qr::{Canvas, SIZE, SyntheticSymbol, data_codewords};

const SCALE: usize = 4;
const QUIET: usize = 4;

fn hello_frame() -> Frame {
    let (pixels, side) = SyntheticSymbol::hello().render(SCALE, QUIET);
    Frame::grayscale(side, side, pixels).unwrap()
}

#[test]
fn hello_codewords_match_the_reference_layout() {
    let bytes = data_codewords(b"HELLO", 16);
    assert_eq!(&bytes[..7], &[0x40, 0x54, 0x84, 0x54, 0xC4, 0xC4, 0xF0]);
    assert_eq!(
        &bytes[7..],
        &[0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC]
    );
}

#[test]
fn module_grid_decodes_directly() {
    let symbol = SyntheticSymbol::hello();
    let decoded = decoder::decode_cells(&symbol.cells(), SIZE).unwrap();
    assert_eq!(decoded.version, 1);
    assert_eq!(decoded.ecc_level, EcLevel::M);
    assert_eq!(decoded.mask, MaskPattern::Pattern0);
    assert_eq!(decoded.data_type, Some(DataType::Byte));
    assert_eq!(decoded.payload, b"HELLO");
    assert_eq!(decoded.eci, None);
}

#[test]
fn every_level_and_mask_round_trips() {
    for level in [EcLevel::L, EcLevel::M, EcLevel::Q, EcLevel::H] {
        for mask in 0..8u8 {
            let symbol = SyntheticSymbol::encode(b"camqr", level, mask);
            let decoded = decoder::decode_cells(&symbol.cells(), SIZE)
                .unwrap_or_else(|e| panic!("level {level} mask {mask}: {e}"));
            assert_eq!(decoded.ecc_level, level);
            assert_eq!(decoded.mask.index(), mask);
            assert_eq!(decoded.payload, b"camqr");
        }
    }
}

#[test]
fn damaged_modules_are_corrected() {
    let mut symbol = SyntheticSymbol::hello();
    // a handful of data modules, well under the level M budget
    for (x, y) in [(20, 20), (19, 19), (15, 12), (11, 18)] {
        symbol.flip(x, y);
    }
    let decoded = decoder::decode_cells(&symbol.cells(), SIZE).unwrap();
    assert_eq!(decoded.payload, b"HELLO");
}

#[test]
fn scrambled_data_fails_with_ecc_error() {
    let mut symbol = SyntheticSymbol::hello();
    symbol.corrupt_data();
    assert_eq!(
        decoder::decode_cells(&symbol.cells(), SIZE),
        Err(DecodeError::DataEcc)
    );
}

#[test]
fn engine_locates_and_decodes_hello() {
    let frame = hello_frame();
    let mut engine = QrEngine::new();
    engine.resize(frame.width(), frame.height()).unwrap();
    engine.load().copy_from_slice(frame.buffer());

    assert_eq!(engine.detect(), 1);
    let region = engine.extract(0);
    assert_eq!(region.size, SIZE);
    let corners: Vec<(i32, i32)> = region.corners.iter().map(|p| p.rounded()).collect();
    assert_eq!(corners, vec![(16, 16), (100, 16), (100, 100), (16, 100)]);

    let decoded = engine.decode(&region).unwrap();
    assert_eq!(decoded.payload_text(), "HELLO");
    assert_eq!(decoded.ecc_level, EcLevel::M);
    engine.release();
}

#[test]
fn detection_is_deterministic() {
    let frame = hello_frame();
    let mut engine = QrEngine::new();
    engine.resize(frame.width(), frame.height()).unwrap();

    let mut runs = Vec::new();
    for _ in 0..2 {
        engine.load().copy_from_slice(frame.buffer());
        let count = engine.detect();
        let regions: Vec<_> = (0..count).map(|i| engine.extract(i).geometry()).collect();
        runs.push(regions);
    }
    assert_eq!(runs[0], runs[1]);
}

#[test]
fn pipeline_reports_hello() {
    let (producer, source) = frame_channel(1, Duration::from_millis(100));
    producer.send(hello_frame()).unwrap();

    let mut controller =
        PipelineController::new(source, QrEngine::new(), CollectingSink::new(), fast_config());
    assert_eq!(
        controller.step().unwrap(),
        CycleOutcome::Processed {
            decoded: 1,
            failed: 0
        }
    );

    let (_, _, sink) = controller.into_parts();
    assert_eq!(sink.events().len(), 1);
    match &sink.events()[0].kind {
        ReportKind::Decoded {
            index,
            geometry,
            symbol,
        } => {
            assert_eq!(*index, 0);
            assert_eq!(geometry.size, SIZE);
            assert_eq!(symbol.payload, b"HELLO");
            assert_eq!(symbol.data_type, Some(DataType::Byte));
            assert_eq!(symbol.ecc_level, EcLevel::M);
            assert_eq!(symbol.mask, MaskPattern::Pattern0);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(producer.recycled_buffer().map(|b| b.len()), Some(116 * 116));
}

#[test]
fn two_symbols_keep_left_to_right_order_and_fail_independently() {
    let side = (SIZE + 2 * QUIET) * SCALE;
    let mut damaged = SyntheticSymbol::encode(b"RIGHT", EcLevel::M, 2);
    damaged.corrupt_data();

    let mut canvas = Canvas::new(side * 2 + 64, side);
    canvas.stamp(
        &SyntheticSymbol::encode(b"LEFT", EcLevel::M, 0),
        0,
        0,
        SCALE,
        QUIET,
    );
    canvas.stamp(&damaged, side + 64, 0, SCALE, QUIET);
    let frame = Frame::grayscale(canvas.width, canvas.height, canvas.pixels).unwrap();

    for parallel in [false, true] {
        let (producer, source) = frame_channel(1, Duration::from_millis(100));
        producer.send(frame.clone()).unwrap();
        let config = PipelineConfig {
            parallel_decode: parallel,
            ..fast_config()
        };
        let mut controller =
            PipelineController::new(source, QrEngine::new(), CollectingSink::new(), config);
        assert_eq!(
            controller.step().unwrap(),
            CycleOutcome::Processed {
                decoded: 1,
                failed: 1
            }
        );

        let (_, _, sink) = controller.into_parts();
        let events = sink.events();
        assert!(matches!(
            &events[0].kind,
            ReportKind::Decoded { index: 0, symbol, .. } if symbol.payload == b"LEFT"
        ));
        assert!(matches!(
            &events[1].kind,
            ReportKind::DecodeFailed { index: 1, .. }
        ));
    }
}

#[test]
fn replayed_images_decode_in_every_raw_format() {
    let dir = tempfile::tempdir().unwrap();
    let (pixels, side) = SyntheticSymbol::hello().render(SCALE, QUIET);
    let path = dir.path().join("hello.png");
    image::GrayImage::from_raw(side as u32, side as u32, pixels)
        .unwrap()
        .save(&path)
        .unwrap();

    for format in [
        PixelFormat::Grayscale,
        PixelFormat::Rgb888,
        PixelFormat::Rgb565,
        PixelFormat::Yuv422,
    ] {
        let source = ImageFileSource::new([path.clone()]).with_pixel_format(format);
        let config = PipelineConfig {
            pixel_format: format,
            ..fast_config()
        };
        let mut controller =
            PipelineController::new(source, QrEngine::new(), CollectingSink::new(), config);
        let stats = controller.run_cycles(2, &Shutdown::new()).unwrap();
        assert_eq!(stats.symbols_decoded, 1, "format {format}");
        assert_eq!(stats.capture_failures, 1, "format {format}");

        let (_, _, sink) = controller.into_parts();
        let symbol = sink.symbols().next().unwrap();
        assert_eq!(symbol.payload_text(), "HELLO");
    }
}

#[test]
fn text_sink_prints_the_console_dump() {
    let (producer, source) = frame_channel(1, Duration::from_millis(100));
    producer.send(hello_frame()).unwrap();

    let sink = TextSink::new(Vec::new());
    let mut controller = PipelineController::new(source, QrEngine::new(), sink, fast_config());
    controller.step().unwrap();

    let (_, _, sink) = controller.into_parts();
    let text = String::from_utf8(sink.into_inner()).unwrap();
    assert!(text.contains("21 cells, corners: (16,16) (100,16) (100,100) (16,100)"));
    assert!(text.contains("Decoding successful:"));
    assert!(text.contains("    Version: 1"));
    assert!(text.contains("    ECC level: M"));
    assert!(text.contains("    Mask: 0"));
    assert!(text.contains("    Data type: 4 (BYTE)"));
    assert!(text.contains("    Length: 5"));
    assert!(text.contains("    Payload: HELLO"));
}
