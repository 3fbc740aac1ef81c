//! Stub collaborators shared by the unit tests.

use crate::actuator::transport::{ActuatorTransport, PortInfo, TransportHandle};
use crate::error::BoxError;
use crate::pipeline::inference::{Classifier, FeatureExtractor};
use crate::pipeline::types::{FeatureVector, FeatureWindow};
use async_trait::async_trait;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Encodes a 1x1 PNG whose pixel carries the values the extractor reads back.
pub fn frame_png(r: u8, g: u8) -> Vec<u8> {
    encode_pixel(Rgb([r, g, 0]))
}

/// A frame the [`PixelExtractor`] reports as "no detection".
pub fn blank_png() -> Vec<u8> {
    encode_pixel(Rgb([0, 0, 255]))
}

fn encode_pixel(pixel: Rgb<u8>) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(1, 1, pixel));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// Maps the first pixel's red and green channels to a 2-dim vector.
pub struct PixelExtractor;

#[async_trait]
impl FeatureExtractor for PixelExtractor {
    async fn extract(&self, image: &DynamicImage) -> Result<Option<FeatureVector>, BoxError> {
        let pixel = image.to_rgb8().get_pixel(0, 0).0;
        if pixel[2] == 255 {
            return Ok(None);
        }
        Ok(Some(FeatureVector::new(vec![pixel[0] as f32, pixel[1] as f32])))
    }
}

/// Returns a vector of the wrong length.
pub struct WrongSizeExtractor;

#[async_trait]
impl FeatureExtractor for WrongSizeExtractor {
    async fn extract(&self, _image: &DynamicImage) -> Result<Option<FeatureVector>, BoxError> {
        Ok(Some(FeatureVector::new(vec![1.0; 7])))
    }
}

pub struct StubClassifier {
    output: Mutex<Result<Vec<f32>, String>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    windows: Mutex<Vec<FeatureWindow>>,
}

impl StubClassifier {
    pub fn fixed(probabilities: Vec<f32>) -> Self {
        Self {
            output: Mutex::new(Ok(probabilities)),
            delay: None,
            calls: AtomicUsize::new(0),
            windows: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        let stub = Self::fixed(Vec::new());
        *stub.output.lock().unwrap() = Err(message.to_string());
        stub
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_output(&self, probabilities: Vec<f32>) {
        *self.output.lock().unwrap() = Ok(probabilities);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn windows(&self) -> Vec<FeatureWindow> {
        self.windows.lock().unwrap().clone()
    }
}

#[async_trait]
impl Classifier for StubClassifier {
    async fn predict(&self, window: &FeatureWindow) -> Result<Vec<f32>, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.windows.lock().unwrap().push(window.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let output = self.output.lock().unwrap().clone();
        output.map_err(BoxError::from)
    }
}

#[derive(Default)]
struct TransportLog {
    enumerations: usize,
    opens: usize,
    closes: usize,
    written: Vec<u8>,
}

/// In-memory transport. Clones share the same log and failure switches.
#[derive(Clone, Default)]
pub struct MemoryTransport {
    ports: Vec<PortInfo>,
    log: Arc<Mutex<TransportLog>>,
    fail_open: Arc<AtomicBool>,
    fail_write: Arc<AtomicBool>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ports(ports: Vec<PortInfo>) -> Self {
        Self {
            ports,
            ..Self::default()
        }
    }

    pub fn fail_open(&self, fail: bool) {
        self.fail_open.store(fail, Ordering::SeqCst);
    }

    pub fn fail_write(&self, fail: bool) {
        self.fail_write.store(fail, Ordering::SeqCst);
    }

    pub fn enumerations(&self) -> usize {
        self.log.lock().unwrap().enumerations
    }

    pub fn opens(&self) -> usize {
        self.log.lock().unwrap().opens
    }

    pub fn closes(&self) -> usize {
        self.log.lock().unwrap().closes
    }

    pub fn written(&self) -> String {
        String::from_utf8_lossy(&self.log.lock().unwrap().written).into_owned()
    }
}

#[async_trait]
impl ActuatorTransport for MemoryTransport {
    async fn enumerate(&self) -> std::io::Result<Vec<PortInfo>> {
        self.log.lock().unwrap().enumerations += 1;
        Ok(self.ports.clone())
    }

    async fn open(&self, id: &str, _baud_rate: u32) -> std::io::Result<Box<dyn TransportHandle>> {
        self.log.lock().unwrap().opens += 1;
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not present", id),
            ));
        }
        Ok(Box::new(MemoryHandle {
            log: self.log.clone(),
            fail_write: self.fail_write.clone(),
            closed: false,
        }))
    }
}

struct MemoryHandle {
    log: Arc<Mutex<TransportLog>>,
    fail_write: Arc<AtomicBool>,
    closed: bool,
}

#[async_trait]
impl TransportHandle for MemoryHandle {
    async fn write_all(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        if self.fail_write.load(Ordering::SeqCst) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "device unplugged",
            ));
        }
        // Split the write so unsynchronised callers would interleave.
        let (head, tail) = bytes.split_at(bytes.len() / 2);
        self.log.lock().unwrap().written.extend_from_slice(head);
        tokio::task::yield_now().await;
        self.log.lock().unwrap().written.extend_from_slice(tail);
        Ok(())
    }

    async fn close(&mut self) -> std::io::Result<()> {
        if !self.closed {
            self.closed = true;
            self.log.lock().unwrap().closes += 1;
        }
        Ok(())
    }
}

impl Drop for MemoryHandle {
    fn drop(&mut self) {
        if !self.closed {
            if let Ok(mut log) = self.log.lock() {
                log.closes += 1;
            }
        }
    }
}
