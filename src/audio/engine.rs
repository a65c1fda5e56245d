//! Real-time output: a mixer owned by the cpal callback, fed over a channel.

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, SampleFormat, Stream};
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, error, info, warn};

use super::voice::Voice;
use crate::core::playback::{ToneEngine, ToneSource};
use crate::core::{PhotismError, PhotismResult};

pub type VoiceId = u64;

/// Keeps a full chord at playback volume below clipping.
pub const MASTER_GAIN: f32 = 0.4;
const MAX_MESSAGES_PER_BUFFER: usize = 256;

/// Messages from tone handles to the audio thread.
#[derive(Debug, Clone, PartialEq)]
pub enum ToneMessage {
    Add(VoiceId, f32),
    SetVolume(VoiceId, f32),
    Start(VoiceId),
    Stop(VoiceId),
    /// The handle is gone. The voice is removed once silent.
    Retire(VoiceId),
}

/// Voices summed by the audio callback.
pub struct Mixer {
    sample_rate: f32,
    voices: HashMap<VoiceId, Voice>,
    retired: HashSet<VoiceId>,
}

impl Mixer {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            voices: HashMap::new(),
            retired: HashSet::new(),
        }
    }

    pub fn handle_message(&mut self, msg: ToneMessage) {
        match msg {
            ToneMessage::Add(id, frequency) => {
                self.voices.insert(id, Voice::new(frequency));
            }
            ToneMessage::SetVolume(id, volume) => {
                if let Some(voice) = self.voices.get_mut(&id) {
                    voice.volume = volume.clamp(0.0, 1.0);
                }
            }
            ToneMessage::Start(id) => {
                if let Some(voice) = self.voices.get_mut(&id) {
                    voice.start();
                }
            }
            ToneMessage::Stop(id) => {
                if let Some(voice) = self.voices.get_mut(&id) {
                    voice.stop();
                }
            }
            ToneMessage::Retire(id) => {
                if let Some(voice) = self.voices.get_mut(&id) {
                    voice.stop();
                    self.retired.insert(id);
                }
            }
        }
    }

    /// Apply pending messages, at most `max_messages` of them.
    pub fn process_messages(&mut self, receiver: &Receiver<ToneMessage>, max_messages: usize) {
        for msg in receiver.try_iter().take(max_messages) {
            self.handle_message(msg);
        }
    }

    pub fn next_sample(&mut self) -> f32 {
        let rate = self.sample_rate;
        let sum: f32 = self
            .voices
            .values_mut()
            .map(|voice| voice.next_sample(rate))
            .sum();
        (sum * MASTER_GAIN).clamp(-1.0, 1.0)
    }

    /// Drop retired voices that have finished their release.
    pub fn collect_garbage(&mut self) {
        let voices = &mut self.voices;
        self.retired.retain(|id| {
            let sounding = voices.get(id).is_some_and(|v| v.is_sounding());
            if !sounding {
                voices.remove(id);
            }
            sounding
        });
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    pub fn sounding_count(&self) -> usize {
        self.voices.values().filter(|v| v.is_sounding()).count()
    }
}

/// Handle to one voice in the mixer.
pub struct CpalTone {
    id: VoiceId,
    frequency: f64,
    sender: Sender<ToneMessage>,
}

impl ToneSource for CpalTone {
    fn frequency(&self) -> f64 {
        self.frequency
    }

    fn set_volume(&mut self, volume: f32) {
        self.sender.send(ToneMessage::SetVolume(self.id, volume)).ok();
    }

    fn start(&mut self) -> PhotismResult<()> {
        self.sender
            .send(ToneMessage::Start(self.id))
            .map_err(|_| PhotismError::collaborator("audio engine", "no output stream is running"))
    }

    fn stop(&mut self) {
        self.sender.send(ToneMessage::Stop(self.id)).ok();
    }
}

impl Drop for CpalTone {
    fn drop(&mut self) {
        self.sender.send(ToneMessage::Retire(self.id)).ok();
    }
}

/// Tone engine backed by a cpal output stream.
///
/// Without an output device the engine is muted: tones can be built, but starting
/// them fails.
pub struct CpalEngine {
    sender: Sender<ToneMessage>,
    next_id: VoiceId,
    sample_rate: u32,
    device_name: Option<String>,
    _stream: Option<Stream>,
}

impl CpalEngine {
    /// Open the preferred output device, falling back to the default one, or to a muted
    /// engine when neither works.
    pub fn new(preferred_device: Option<&str>) -> Self {
        match Self::open(preferred_device) {
            Ok(engine) => engine,
            Err(e) => {
                warn!("Audio output unavailable, running muted: {:#}", e);
                Self::muted()
            }
        }
    }

    pub fn muted() -> Self {
        let (sender, _) = unbounded();
        Self {
            sender,
            next_id: 0,
            sample_rate: 44_100,
            device_name: None,
            _stream: None,
        }
    }

    pub fn open(preferred_device: Option<&str>) -> Result<Self> {
        let host = cpal::default_host();
        debug!("Using audio host: {}", host.id().name());

        let preferred = match preferred_device {
            Some(name) => host
                .output_devices()
                .context("Failed to list output devices")?
                .find(|d| d.name().map(|n| n == name).unwrap_or(false)),
            None => None,
        };
        if preferred.is_none() {
            if let Some(name) = preferred_device {
                warn!("Output device '{}' not found, using the default", name);
            }
        }
        let device = match preferred {
            Some(device) => device,
            None => host
                .default_output_device()
                .ok_or_else(|| anyhow::anyhow!("No output device available"))?,
        };
        let device_name = device.name().ok();

        let config = device
            .default_output_config()
            .context("Failed to query output config")?;
        let sample_format = config.sample_format();
        let config = cpal::StreamConfig::from(config);
        let sample_rate = config.sample_rate.0;

        let (sender, receiver) = unbounded();
        let stream = match sample_format {
            SampleFormat::F32 => create_stream::<f32>(&device, &config, receiver),
            SampleFormat::I16 => create_stream::<i16>(&device, &config, receiver),
            SampleFormat::U16 => create_stream::<u16>(&device, &config, receiver),
            other => anyhow::bail!("Unsupported sample format {:?}", other),
        }?;
        stream.play().context("Failed to start output stream")?;

        info!(
            "Audio output on {} at {} Hz",
            device_name.as_deref().unwrap_or("unknown device"),
            sample_rate
        );

        Ok(Self {
            sender,
            next_id: 0,
            sample_rate,
            device_name,
            _stream: Some(stream),
        })
    }

    pub fn is_muted(&self) -> bool {
        self._stream.is_none()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn device_name(&self) -> Option<&str> {
        self.device_name.as_deref()
    }
}

impl ToneEngine for CpalEngine {
    type Source = CpalTone;

    fn build_source(&mut self, frequency: f64) -> PhotismResult<CpalTone> {
        let id = self.next_id;
        self.next_id += 1;
        if self.sender.send(ToneMessage::Add(id, frequency as f32)).is_err() {
            debug!("Muted engine, tone {} at {:.2} Hz will stay silent", id, frequency);
        }
        Ok(CpalTone {
            id,
            frequency,
            sender: self.sender.clone(),
        })
    }
}

/// Names of every output device on the default host.
pub fn output_device_names() -> Vec<String> {
    let host = cpal::default_host();
    match host.output_devices() {
        Ok(devices) => devices.filter_map(|d| d.name().ok()).collect(),
        Err(e) => {
            warn!("Failed to list output devices: {}", e);
            Vec::new()
        }
    }
}

fn create_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    receiver: Receiver<ToneMessage>,
) -> Result<Stream>
where
    T: Sample + Send + 'static + cpal::SizedSample + cpal::FromSample<f32>,
{
    let channels = config.channels as usize;
    let mut mixer = Mixer::new(config.sample_rate.0 as f32);
    let err_fn = |err| error!("Audio stream error: {}", err);

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            mixer.process_messages(&receiver, MAX_MESSAGES_PER_BUFFER);
            for frame in data.chunks_mut(channels) {
                let value = T::from_sample(mixer.next_sample());
                for sample in frame.iter_mut() {
                    *sample = value;
                }
            }
            mixer.collect_garbage();
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}
