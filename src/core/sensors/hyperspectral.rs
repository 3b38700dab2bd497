//! Hyperspectral material scanner.
//!
//! A scan line sweeps the frame from top to bottom. Every object whose
//! vertical span the line crosses is analysed once per scan; hazardous and
//! suspicious materials are published as they are found, and the full list
//! goes out with `scanComplete` when the line reaches the bottom.

use chrono::Utc;
use rand::Rng;

use super::{random_location, FRAME_HEIGHT};
use crate::core::bus::EventBus;
use crate::core::events::{DashboardEvent, Detection, Location, Material, MaterialStatus, ScanReport};

pub const SCENE_OBJECTS: usize = 15;

pub const MATERIALS: [Material; 8] = [
    Material { name: "Concrete", signature: "concrete", status: MaterialStatus::Safe },
    Material { name: "Brick", signature: "brick", status: MaterialStatus::Safe },
    Material { name: "Plastic", signature: "plastic", status: MaterialStatus::Suspicious },
    Material { name: "Metal", signature: "metal", status: MaterialStatus::Safe },
    Material { name: "Explosive", signature: "explosive", status: MaterialStatus::Danger },
    Material { name: "Organic", signature: "organic", status: MaterialStatus::Safe },
    Material { name: "Glass", signature: "glass", status: MaterialStatus::Safe },
    Material { name: "Fabric", signature: "fabric", status: MaterialStatus::Safe },
];

#[derive(Debug, Clone)]
pub struct ScanObject {
    /// Top-left corner
    pub origin: Location,
    pub width: f64,
    pub height: f64,
    pub material: Material,
    pub detected: bool,
}

impl ScanObject {
    fn center(&self) -> Location {
        Location::new(self.origin.x + self.width / 2.0, self.origin.y + self.height / 2.0)
    }

    /// Whether the band `[from, to]` overlaps the object's vertical span.
    fn crossed_by(&self, from: f64, to: f64) -> bool {
        from <= self.origin.y + self.height && to >= self.origin.y
    }
}

pub struct HyperspectralScanner {
    objects: Vec<ScanObject>,
    detections: Vec<Detection>,
    /// Percent, 0..=100
    progress: f64,
    scanning: bool,
    next_detection_id: u64,
}

impl HyperspectralScanner {
    /// Build a scanner over a freshly generated random scene.
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        let objects = (0..SCENE_OBJECTS)
            .map(|_| ScanObject {
                origin: random_location(rng, 50.0),
                width: rng.gen_range(30.0..80.0),
                height: rng.gen_range(30.0..80.0),
                material: MATERIALS[rng.gen_range(0..MATERIALS.len())],
                detected: false,
            })
            .collect();
        Self::with_scene(objects)
    }

    pub fn with_scene(objects: Vec<ScanObject>) -> Self {
        Self {
            objects,
            detections: Vec::new(),
            progress: 0.0,
            scanning: false,
            next_detection_id: 0,
        }
    }

    /// Begin a new sweep. Ignored while a sweep is already in progress.
    pub fn start_scan(&mut self, bus: &EventBus) -> bool {
        if self.scanning {
            return false;
        }
        self.scanning = true;
        self.progress = 0.0;
        self.detections.clear();
        for object in self.objects.iter_mut() {
            object.detected = false;
        }
        log::info!("hyperspectral scan started over {} objects", self.objects.len());
        bus.emit(DashboardEvent::ScanStarted);
        true
    }

    /// Move the scan line forward by `step` percent and analyse what it crossed.
    pub fn advance<R: Rng>(&mut self, bus: &EventBus, rng: &mut R, step: f64) {
        if !self.scanning {
            return;
        }
        let from = self.progress / 100.0 * FRAME_HEIGHT;
        self.progress = (self.progress + step).min(100.0);
        let to = self.progress / 100.0 * FRAME_HEIGHT;

        for idx in 0..self.objects.len() {
            if !self.objects[idx].detected && self.objects[idx].crossed_by(from, to) {
                self.analyze(bus, rng, idx);
            }
        }

        if self.progress >= 100.0 {
            self.scanning = false;
            log::info!("hyperspectral scan complete: {} detections", self.detections.len());
            bus.emit(DashboardEvent::ScanComplete(ScanReport {
                detections: self.detections.clone(),
            }));
        }
    }

    fn analyze<R: Rng>(&mut self, bus: &EventBus, rng: &mut R, idx: usize) {
        let object = &mut self.objects[idx];
        object.detected = true;
        self.next_detection_id += 1;
        let detection = Detection {
            id: self.next_detection_id,
            material: object.material,
            confidence: rng.gen_range(85.0..99.0),
            location: object.center(),
            timestamp: Utc::now(),
        };
        self.detections.push(detection.clone());

        match detection.material.status {
            MaterialStatus::Danger => {
                bus.emit(DashboardEvent::DangerDetected(detection));
            }
            MaterialStatus::Suspicious => {
                bus.emit(DashboardEvent::SuspiciousDetected(detection));
            }
            MaterialStatus::Safe => {}
        }
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    pub fn objects(&self) -> &[ScanObject] {
        &self.objects
    }
}
