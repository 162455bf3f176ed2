use crate::engine::FaceRect;
use crate::frame::FrameBuffer;

/// 1サイクルあたりの追従ゲイン (時定数 約50サイクル)
pub const DEFAULT_ROI_GAIN: f32 = 0.02;

/// 顔中心の一次指数平滑化フィルタ
///
/// 追跡成功中は観測した顔矩形の中心へ `gain` ずつ近づき、
/// 追跡を失ったら画像中心へ即座に戻す。
#[derive(Debug, Clone)]
pub struct RoiSmoother {
    gain: f32,
    frame_center: (f32, f32),
    center: (f32, f32),
}

impl RoiSmoother {
    pub fn new(frame_width: u32, frame_height: u32, gain: f32) -> Self {
        let frame_center = (frame_width as f32 / 2.0, frame_height as f32 / 2.0);
        Self {
            gain,
            frame_center,
            center: frame_center,
        }
    }

    pub fn for_frame(frame: &FrameBuffer, gain: f32) -> Self {
        Self::new(frame.width(), frame.height(), gain)
    }

    pub fn update(&mut self, tracking_succeeded: bool, rect: Option<&FaceRect>) -> (f32, f32) {
        if !tracking_succeeded {
            self.reset();
            return self.center;
        }

        let (raw_x, raw_y) = rect.map_or(self.frame_center, FaceRect::center);
        let g = self.gain;
        self.center = (
            self.center.0 + g * (raw_x - self.center.0),
            self.center.1 + g * (raw_y - self.center.1),
        );
        self.center
    }

    /// 画像中心へスナップ
    pub fn reset(&mut self) {
        self.center = self.frame_center;
    }

    pub fn center(&self) -> (f32, f32) {
        self.center
    }

    pub fn frame_center(&self) -> (f32, f32) {
        self.frame_center
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq_f32(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn test_starts_at_frame_center() {
        let s = RoiSmoother::new(640, 480, DEFAULT_ROI_GAIN);
        assert_eq!(s.center(), (320.0, 240.0));
    }

    #[test]
    fn test_single_step() {
        let mut s = RoiSmoother::new(640, 480, DEFAULT_ROI_GAIN);
        // center (420, 340): +100 each axis → +2
        let rect = FaceRect::new(370, 290, 470, 390);
        let (x, y) = s.update(true, Some(&rect));
        assert!(approx_eq_f32(x, 322.0, 1e-4));
        assert!(approx_eq_f32(y, 242.0, 1e-4));
    }

    #[test]
    fn test_converges_monotonically_without_overshoot() {
        let mut s = RoiSmoother::new(640, 480, DEFAULT_ROI_GAIN);
        let rect = FaceRect::new(500, 100, 540, 140);
        let (tx, ty) = rect.center();
        let mut prev = s.center();
        for _ in 0..500 {
            let cur = s.update(true, Some(&rect));
            assert!(cur.0 >= prev.0 && cur.0 <= tx);
            assert!(cur.1 <= prev.1 && cur.1 >= ty);
            prev = cur;
        }
        assert!(approx_eq_f32(prev.0, tx, 0.1));
        assert!(approx_eq_f32(prev.1, ty, 0.1));
    }

    #[test]
    fn test_lost_snaps_to_frame_center() {
        let mut s = RoiSmoother::new(640, 480, DEFAULT_ROI_GAIN);
        let rect = FaceRect::new(0, 0, 20, 20);
        for _ in 0..100 {
            s.update(true, Some(&rect));
        }
        assert_ne!(s.center(), (320.0, 240.0));
        assert_eq!(s.update(false, None), (320.0, 240.0));
        // 矩形が渡されても追跡失敗なら無視
        assert_eq!(s.update(false, Some(&rect)), (320.0, 240.0));
    }

    #[test]
    fn test_success_without_rect_drifts_to_center() {
        let mut s = RoiSmoother::new(100, 100, 0.5);
        s.update(true, Some(&FaceRect::new(0, 0, 0, 0)));
        assert_eq!(s.center(), (25.0, 25.0));
        s.update(true, None);
        assert_eq!(s.center(), (37.5, 37.5));
    }

    #[test]
    fn test_for_frame() {
        let fb = FrameBuffer::allocate(1280, 960, crate::frame::PixelFormat::Bgrx8);
        let s = RoiSmoother::for_frame(&fb, DEFAULT_ROI_GAIN);
        assert_eq!(s.frame_center(), (640.0, 480.0));
    }
}
