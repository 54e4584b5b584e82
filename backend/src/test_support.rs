//! Fixtures shared by the unit tests: in-memory images, stub classifiers and a
//! local upstream image server.

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use actix_web::dev::Service;
use actix_web::{App, HttpResponse, HttpServer, web};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use ndarray::Array4;

use crate::inference::model::{Classifier, InferenceError, first_probability};

pub fn png_bytes(image: DynamicImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

pub fn rgba_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 200, 128])
    });
    png_bytes(DynamicImage::ImageRgba8(img))
}

/// Returns a fixed probability regardless of input.
pub struct FixedClassifier(pub f32);

impl Classifier for FixedClassifier {
    fn predict(&self, input: &Array4<f32>) -> Result<f32, InferenceError> {
        assert_eq!(input.shape(), &[1, 224, 224, 3]);
        first_probability(&[self.0])
    }
}

/// A local image host; counts every request it receives.
pub struct Upstream {
    base: String,
    hits: Arc<AtomicUsize>,
}

impl Upstream {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Serves `/cat.png` (512x512 RGBA), `/missing.png` (404), `/page.html`,
/// `/slow.png` (stalls for 5s) and `/huge.bin` (4 KiB) on an ephemeral port.
pub fn spawn_upstream() -> Upstream {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    let server = HttpServer::new(move || {
        let counter = counter.clone();
        App::new()
            .wrap_fn(move |req, srv| {
                counter.fetch_add(1, Ordering::SeqCst);
                srv.call(req)
            })
            .route(
                "/cat.png",
                web::get().to(|| async {
                    HttpResponse::Ok()
                        .content_type("image/png")
                        .body(rgba_png(512, 512))
                }),
            )
            .route(
                "/missing.png",
                web::get().to(|| async { HttpResponse::NotFound().finish() }),
            )
            .route(
                "/page.html",
                web::get().to(|| async {
                    HttpResponse::Ok()
                        .content_type("text/html")
                        .body("<html><body>hello</body></html>")
                }),
            )
            .route(
                "/slow.png",
                web::get().to(|| async {
                    actix_web::rt::time::sleep(Duration::from_secs(5)).await;
                    HttpResponse::Ok().content_type("image/png").body(rgba_png(8, 8))
                }),
            )
            .route(
                "/huge.bin",
                web::get().to(|| async { HttpResponse::Ok().body(vec![0u8; 4096]) }),
            )
    })
    .workers(1)
    .disable_signals()
    .shutdown_timeout(0)
    .bind(("127.0.0.1", 0))
    .unwrap();

    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    Upstream {
        base: format!("http://{}", addr),
        hits,
    }
}
