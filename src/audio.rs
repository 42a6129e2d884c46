use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};

use crate::click::Clicker;

/// Keeps the cpal output stream alive.  Dropping it stops audio.
pub struct AudioEngine {
    _stream: Stream,
}

impl AudioEngine {
    pub fn new(clicker: Arc<Mutex<Clicker>>) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow!("no output device available"))?;

        let supported = device.default_output_config()?;
        let format = supported.sample_format();
        let config: StreamConfig = supported.into();
        let sample_rate = config.sample_rate.0 as f32;

        if let Ok(mut c) = clicker.lock() {
            c.set_sample_rate(sample_rate);
        }
        log::info!(
            "audio output: {} ({} Hz, {} ch, {:?})",
            device.name().unwrap_or_else(|_| "unknown".to_string()),
            sample_rate,
            config.channels,
            format
        );

        let stream = match format {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, clicker)?,
            SampleFormat::I16 => build_stream::<i16>(&device, &config, clicker)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &config, clicker)?,
            other => return Err(anyhow!("unsupported sample format {:?}", other)),
        };

        stream.play()?;
        Ok(Self { _stream: stream })
    }
}

fn build_stream<T>(device: &Device, config: &StreamConfig, clicker: Arc<Mutex<Clicker>>) -> Result<Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let Ok(mut clicker) = clicker.lock() else {
                data.fill(T::EQUILIBRIUM);
                return;
            };
            write_frames(data, channels, || clicker.generate_sample());
        },
        |err| log::error!("audio stream error: {}", err),
        None,
    )?;
    Ok(stream)
}

/// Renders one sample per frame and copies it to every channel.
fn write_frames<T, F>(data: &mut [T], channels: usize, mut next: F)
where
    T: Sample + FromSample<f32>,
    F: FnMut() -> f32,
{
    for frame in data.chunks_mut(channels.max(1)) {
        let value = T::from_sample(next());
        for channel_sample in frame.iter_mut() {
            *channel_sample = value;
        }
    }
}
