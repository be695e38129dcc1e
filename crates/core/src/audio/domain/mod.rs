pub mod pcm_audio;
pub mod duration_probe;
