use std::io::Cursor;

use spindle::audio::{persist, RecordedSample, SampleBuilder};

fn scratch_dir(tag: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("spindle-recorder-{}-{}", tag, uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_wav_artifact_shape() {
    let mut builder = SampleBuilder::new(16_000, 1, 2, 4);
    builder.push_frame(&[0, 100, -100, 32_000]);
    builder.push_frame(&[1, 2, 3, 4]);
    let sample = builder.finish();

    assert_eq!(sample.frames, 2);
    assert!((sample.duration_secs() - 8.0 / 16_000.0).abs() < 1e-9);

    let wav = sample.encode_wav().unwrap();
    let reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
    let spec = reader.spec();

    // Mono, fixed rate, 16-bit signed PCM.
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 16_000);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_format, hound::SampleFormat::Int);

    let decoded: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(decoded, vec![0, 100, -100, 32_000, 1, 2, 3, 4]);
}

#[test]
fn test_persist_is_single_slot() {
    let dir = scratch_dir("slot");

    let first = RecordedSample {
        samples: vec![1i16; 1600],
        frames: 1,
        sample_rate: 16_000,
        channels: 1,
    };
    let handle = persist(&first, &dir).unwrap();
    assert_eq!(handle.path, dir.join("sample.wav"));
    assert_eq!(std::fs::read(&handle.path).unwrap(), handle.wav);

    // The next episode overwrites the same slot; no history accumulates.
    let second = RecordedSample {
        samples: vec![2i16; 3200],
        frames: 2,
        sample_rate: 16_000,
        channels: 1,
    };
    let handle2 = persist(&second, &dir).unwrap();
    assert_eq!(handle2.path, handle.path);
    assert_eq!(std::fs::read(&handle2.path).unwrap(), handle2.wav);
    assert_ne!(handle.wav, handle2.wav);

    let entries: Vec<_> = std::fs::read_dir(&dir).unwrap().collect();
    assert_eq!(entries.len(), 1);

    std::fs::remove_dir_all(&dir).ok();
}
