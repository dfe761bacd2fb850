mod common;

use common::Harness;
use qr_studio_core::domain::ErrorCorrectionLevel;
use qr_studio_core::ports::KeyValueStore;
use std::collections::BTreeSet;
use std::sync::atomic::Ordering;
use studio_lib::adapters::qr_encoder::SymbolLayout;
use studio_lib::app::export::decode_data_url;
use studio_lib::app::HISTORY_KEY;
use studio_lib::{GenerateError, StudioError};

fn decode_symbol(png: &[u8]) -> String {
    let img = image::load_from_memory(png).unwrap().to_luma8();
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        img.width() as usize,
        img.height() as usize,
        |x, y| img.get_pixel(x as u32, y as u32).0[0],
    );
    let grids = prepared.detect_grids();
    assert_eq!(grids.len(), 1, "expected exactly one symbol");
    let (_meta, content) = grids[0].decode().unwrap();
    content
}

#[tokio::test]
async fn example_url_lands_in_history() {
    let h = Harness::new();
    h.studio
        .configure(|cfg| {
            cfg.set_content("https://example.com");
            cfg.set_pixel_size(300);
            cfg.set_margin(2);
            cfg.set_error_correction(ErrorCorrectionLevel::Medium);
        })
        .await;

    let pair = h.studio.generate().await.unwrap();
    assert_eq!(pair.pixel_size, 300);

    let history = h.studio.history().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].text, "https://example.com");
    assert_eq!(history[0].raster, pair.raster);
    assert_eq!(h.studio.current().await, Some(pair));
}

#[tokio::test]
async fn raster_decodes_back_to_content() {
    let h = Harness::new();
    for (text, level) in [
        ("https://example.com/a?b=c", ErrorCorrectionLevel::Low),
        ("HELLO WORLD 12345", ErrorCorrectionLevel::High),
    ] {
        h.studio
            .configure(|cfg| {
                cfg.set_content(text);
                cfg.set_pixel_size(300);
                cfg.set_margin(4);
                cfg.set_error_correction(level);
            })
            .await;
        let pair = h.studio.generate().await.unwrap();
        let png = decode_data_url(pair.raster.data_url()).unwrap();
        assert_eq!(decode_symbol(&png), text);
    }
}

/// Dark modules drawn by the SVG, read back from its run-length path.
fn vector_modules(svg: &str) -> BTreeSet<(u32, u32)> {
    let d = svg.split(r#" d=""#).nth(2).unwrap();
    let d = &d[..d.find('"').unwrap()];
    let mut modules = BTreeSet::new();
    for run in d.split('M').filter(|r| !r.is_empty()) {
        let (x, rest) = run.split_once(' ').unwrap();
        let (y, rest) = rest.split_once('h').unwrap();
        let (len, _) = rest.split_once('v').unwrap();
        let (x, y, len): (u32, u32, u32) =
            (x.parse().unwrap(), y.parse().unwrap(), len.parse().unwrap());
        modules.extend((x..x + len).map(|mx| (mx, y)));
    }
    modules
}

/// Dark modules in the PNG, sampled at each module centre.
fn raster_modules(png: &[u8], modules: u32) -> BTreeSet<(u32, u32)> {
    let img = image::load_from_memory(png).unwrap().to_luma8();
    let scale = f64::from(img.width()) / f64::from(modules);
    let centre = |m: u32| ((f64::from(m) + 0.5) * scale) as u32;
    let mut dark = BTreeSet::new();
    for my in 0..modules {
        for mx in 0..modules {
            if img.get_pixel(centre(mx), centre(my)).0[0] < 128 {
                dark.insert((mx, my));
            }
        }
    }
    dark
}

#[tokio::test]
async fn raster_and_vector_draw_the_same_modules() {
    let h = Harness::new();
    for (text, margin, level) in [
        ("same symbol", 4, ErrorCorrectionLevel::Medium),
        ("https://example.com/path?q=1", 0, ErrorCorrectionLevel::High),
    ] {
        h.studio
            .configure(|cfg| {
                cfg.set_content(text);
                cfg.set_pixel_size(256);
                cfg.set_margin(margin);
                cfg.set_error_correction(level);
            })
            .await;
        let pair = h.studio.generate().await.unwrap();

        let layout = SymbolLayout::build(text, &pair.options).unwrap();
        let m = layout.modules();
        let expected: BTreeSet<(u32, u32)> = (0..m)
            .flat_map(|y| (0..m).map(move |x| (x, y)))
            .filter(|&(x, y)| layout.is_dark_module(x, y))
            .collect();
        assert!(!expected.is_empty());

        let png = decode_data_url(pair.raster.data_url()).unwrap();
        assert_eq!(vector_modules(pair.vector.markup()), expected, "{}", text);
        assert_eq!(raster_modules(&png, m), expected, "{}", text);
    }
}

#[tokio::test]
async fn raster_and_vector_share_dimensions() {
    let h = Harness::new();
    h.studio
        .configure(|cfg| {
            cfg.set_content("same symbol");
            cfg.set_pixel_size(256);
        })
        .await;
    let pair = h.studio.generate().await.unwrap();

    let png = decode_data_url(pair.raster.data_url()).unwrap();
    let img = image::load_from_memory(&png).unwrap();
    assert_eq!((img.width(), img.height()), (256, 256));
    assert!(pair.vector.markup().contains(r#"width="256" height="256""#));
}

#[tokio::test]
async fn empty_content_is_skipped_without_side_effects() {
    let h = Harness::new();
    let first = h.generate("kept").await.unwrap();
    let calls = h.encoder.calls.load(Ordering::SeqCst);

    for blank in ["", "   ", "\n\t"] {
        let err = h.generate(blank).await.unwrap_err();
        assert!(matches!(
            err,
            StudioError::Generate(GenerateError::ValidationSkip)
        ));
    }

    assert_eq!(h.encoder.calls.load(Ordering::SeqCst), calls);
    assert_eq!(h.studio.history().await.len(), 1);
    assert_eq!(h.studio.current().await, Some(first));
}

#[tokio::test]
async fn encoding_failure_keeps_previous_result() {
    let h = Harness::new();
    let first = h.generate("before").await.unwrap();
    let persisted = h.store.get(HISTORY_KEY).unwrap();

    h.encoder.fail.store(true, Ordering::SeqCst);
    let err = h.generate("after").await.unwrap_err();
    assert!(matches!(
        err,
        StudioError::Generate(GenerateError::EncodingFailure(_))
    ));

    assert_eq!(h.studio.current().await, Some(first));
    assert_eq!(h.studio.history().await.len(), 1);
    assert_eq!(h.store.get(HISTORY_KEY).unwrap(), persisted);
}

#[tokio::test]
async fn oversized_content_fails_at_high_but_not_low() {
    let h = Harness::new();
    let long = "x".repeat(1500);
    h.studio
        .configure(|cfg| {
            cfg.set_content(long.as_str());
            cfg.set_error_correction(ErrorCorrectionLevel::High);
        })
        .await;
    assert!(h.studio.generate().await.is_err());
    assert!(h.studio.current().await.is_none());

    h.studio
        .configure(|cfg| cfg.set_error_correction(ErrorCorrectionLevel::Low))
        .await;
    assert!(h.studio.generate().await.is_ok());
}

#[tokio::test]
async fn identical_content_is_logged_twice() {
    let h = Harness::new();
    h.generate("dup").await.unwrap();
    h.generate("dup").await.unwrap();

    let history = h.studio.history().await;
    assert_eq!(history.len(), 2);
    assert!(history[0].id > history[1].id);
}
