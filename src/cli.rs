// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for scanner operations
//!
//! This module provides command-line functionality for:
//! - Running the scan loop against real or simulated hardware
//! - Listing serial ports
//! - Probing one measurement cycle and printing a JSON summary

use chrono::Local;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use stripscan::backends::link::{ReportLink, SerialLink, StdoutLink, available_ports};
use stripscan::backends::sensor::{ImageSensor, SensorRotation, SimSensor, V4lSensor};
use stripscan::constants::{capture, geometry, serial, timing};
use stripscan::errors::AppError;
use stripscan::pipeline::{
    FrameCollector, Packetizer, RegionTable, SampleSource, ScanRunner, ScanScheduler, TickOutcome,
};

/// Options for the `run` subcommand
pub struct RunOptions {
    pub device: String,
    pub port: String,
    pub stdout: bool,
    pub simulate: bool,
    pub image: Option<PathBuf>,
    pub cycles: Option<u64>,
    pub rotate: i32,
    pub blobs: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            device: capture::DEFAULT_DEVICE.to_string(),
            port: serial::DEFAULT_PORT.to_string(),
            stdout: false,
            simulate: false,
            image: None,
            cycles: None,
            rotate: 0,
            blobs: false,
        }
    }
}

/// Run the scan loop until interrupted or the cycle limit is reached
pub fn run(options: RunOptions) -> Result<(), Box<dyn std::error::Error>> {
    let rotation = SensorRotation::from_degrees_int(options.rotate);

    let sensor: Box<dyn ImageSensor> = if let Some(path) = options.image.as_deref() {
        Box::new(SimSensor::from_image(path)?)
    } else if options.simulate {
        Box::new(SimSensor::test_pattern())
    } else {
        Box::new(V4lSensor::open(&options.device, rotation)?)
    };

    let link: Box<dyn ReportLink> = if options.stdout {
        Box::new(StdoutLink)
    } else {
        Box::new(SerialLink::open(&options.port)?)
    };

    // The table is compiled in, so a mismatch can only come from rotation
    let table = RegionTable::quad_carrier();
    let (width, height) = if rotation.swaps_dimensions() {
        (geometry::FRAME_HEIGHT, geometry::FRAME_WIDTH)
    } else {
        (geometry::FRAME_WIDTH, geometry::FRAME_HEIGHT)
    };
    if !table.fits_within(width, height) {
        return Err(AppError::Config(format!(
            "region table does not fit a {width}x{height} frame"
        ))
        .into());
    }

    let source = if options.blobs {
        SampleSource::blobs()
    } else {
        SampleSource::intensity()
    };

    let mut runner = ScanRunner::new(
        sensor,
        link,
        FrameCollector::new(source),
        table,
        timing::FRAMES_PER_SLOT,
    );

    let stop = runner.stop_signal();
    ctrlc::set_handler(move || {
        stop.store(true, Ordering::SeqCst);
    })?;

    runner.run(options.cycles)?;
    Ok(())
}

/// List serial ports usable as report links
pub fn list_ports() -> Result<(), Box<dyn std::error::Error>> {
    let ports = available_ports();

    if ports.is_empty() {
        println!("No serial ports found.");
        return Ok(());
    }

    println!("Available serial ports:");
    for port in ports {
        println!("  {}", port);
    }

    Ok(())
}

/// One-cycle summary printed by `probe`
#[derive(Serialize)]
struct ProbeSummary {
    timestamp: String,
    sensor: String,
    source: &'static str,
    frames: u64,
    values: Vec<u32>,
    report: String,
    packet: String,
    packet_index: u8,
}

/// Scan exactly one cycle without hardware and print a JSON summary
pub fn probe(image: Option<&Path>, blobs: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut sensor = match image {
        Some(path) => SimSensor::from_image(path)?,
        None => SimSensor::test_pattern(),
    };

    let table = RegionTable::quad_carrier();
    let source = if blobs {
        SampleSource::blobs()
    } else {
        SampleSource::intensity()
    };
    let collector = FrameCollector::new(source);
    let mut scheduler = ScanScheduler::new(table.len() as u32, timing::FRAMES_PER_SLOT);
    let mut packetizer = Packetizer::new();

    let report = loop {
        let frame = sensor.capture_frame()?;
        let sample = table
            .get(scheduler.active_region())
            .and_then(|region| collector.collect(&frame, region));
        if let TickOutcome::CycleComplete { report, .. } = scheduler.tick(sample) {
            break report;
        }
    };
    let packet = packetizer.packetize(&report);

    let summary = ProbeSummary {
        timestamp: Local::now().to_rfc3339(),
        sensor: sensor.name().to_string(),
        source: collector.source_name(),
        frames: sensor.frames_served(),
        values: report.values().to_vec(),
        report: report.to_string(),
        packet: packet.to_string(),
        packet_index: packet.index(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
