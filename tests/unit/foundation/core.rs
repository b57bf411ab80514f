use super::*;

#[test]
fn frame_file_names_are_zero_padded() {
    assert_eq!(FrameIndex(0).file_name(), "frame_0000.png");
    assert_eq!(FrameIndex(42).file_name(), "frame_0042.png");
    assert_eq!(FrameIndex(12345).file_name(), "frame_12345.png");
}

#[test]
fn fps_rounding_and_ffmpeg_form() {
    assert_eq!(FPS.secs_to_frames_round(2.5), 75);
    assert_eq!(FPS.secs_to_frames_round(0.01), 0);
    assert_eq!(FPS.ffmpeg_arg(), "30");
    let ntsc = Fps {
        num: 30000,
        den: 1001,
    };
    assert_eq!(ntsc.ffmpeg_arg(), "30000/1001");
    assert_eq!(ntsc.secs_to_frames_round(1001.0), 30000);
}

#[test]
fn canvas_orientation() {
    assert!(
        Canvas {
            width: 720,
            height: 1280
        }
        .is_portrait()
    );
    assert!(
        !Canvas {
            width: 1280,
            height: 720
        }
        .is_portrait()
    );
}
