/// Decoded mono PCM normalized to [-1.0, 1.0], ready for inference.
#[derive(Clone, Debug, PartialEq)]
pub struct PcmAudio {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl PcmAudio {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_keeps_fields() {
        let samples = vec![0.25f32; 160];
        let pcm = PcmAudio::new(samples.clone(), 16000);
        assert_eq!(pcm.samples(), &samples[..]);
        assert_eq!(pcm.sample_rate(), 16000);
    }

    #[test]
    fn test_duration() {
        let pcm = PcmAudio::new(vec![0.0; 48000], 16000);
        assert_eq!(pcm.duration(), 3.0);
    }

    #[test]
    fn test_zero_rate_has_zero_duration() {
        let pcm = PcmAudio::new(vec![0.0; 10], 0);
        assert_eq!(pcm.duration(), 0.0);
    }
}
