use tracing::debug;

/// セッションの追跡状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingState {
    #[default]
    Uninitialized,
    Tracking,
    Lost,
}

impl TrackingState {
    pub fn is_tracking(self) -> bool {
        self == TrackingState::Tracking
    }
}

/// エンジンへの要求の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitRequest {
    /// 前フレームとの連続性を仮定しない
    ColdStart,
    /// 前フレームのフィットを引き継いで更新
    Continue,
}

/// 毎サイクル、コールドスタートか継続かを決める状態機械
#[derive(Debug, Clone, Default)]
pub struct TrackingStateMachine {
    state: TrackingState,
}

impl TrackingStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TrackingState {
        self.state
    }

    /// Tracking 以外からは必ず ColdStart。
    /// ヒントの有無はどちらの要求になるかに影響しない。
    pub fn advance(&self, has_hint: bool) -> FitRequest {
        let request = if self.state.is_tracking() {
            FitRequest::Continue
        } else {
            FitRequest::ColdStart
        };
        debug!(state = ?self.state, has_hint, ?request, "fit request");
        request
    }

    /// エンジン呼び出しの結果を反映する。
    /// 呼び出し自体とエンジンのステータスの両方が成功したときのみ Tracking。
    pub fn complete(&mut self, call_succeeded: bool, status_succeeded: bool) -> TrackingState {
        self.state = if call_succeeded && status_succeeded {
            TrackingState::Tracking
        } else {
            TrackingState::Lost
        };
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_cold_starts() {
        let sm = TrackingStateMachine::new();
        assert_eq!(sm.state(), TrackingState::Uninitialized);
        assert_eq!(sm.advance(true), FitRequest::ColdStart);
        assert_eq!(sm.advance(false), FitRequest::ColdStart);
    }

    #[test]
    fn test_success_then_continue() {
        let mut sm = TrackingStateMachine::new();
        assert_eq!(sm.complete(true, true), TrackingState::Tracking);
        assert_eq!(sm.advance(true), FitRequest::Continue);
        assert_eq!(sm.advance(false), FitRequest::Continue);
        assert_eq!(sm.complete(true, true), TrackingState::Tracking);
    }

    #[test]
    fn test_failed_call_goes_lost() {
        let mut sm = TrackingStateMachine::new();
        sm.complete(true, true);
        assert_eq!(sm.complete(false, true), TrackingState::Lost);
        assert_eq!(sm.advance(true), FitRequest::ColdStart);
    }

    #[test]
    fn test_failed_status_goes_lost() {
        let mut sm = TrackingStateMachine::new();
        sm.complete(true, true);
        assert_eq!(sm.complete(true, false), TrackingState::Lost);
        assert_eq!(sm.advance(true), FitRequest::ColdStart);
    }

    #[test]
    fn test_uninitialized_failure_goes_lost() {
        let mut sm = TrackingStateMachine::new();
        assert_eq!(sm.complete(false, false), TrackingState::Lost);
    }

    #[test]
    fn test_never_continue_after_non_tracking() {
        let outcomes = [
            (true, true),
            (false, true),
            (true, false),
            (true, true),
            (true, true),
            (false, false),
        ];
        let mut sm = TrackingStateMachine::new();
        for (call, status) in outcomes {
            let prev = sm.state();
            let request = sm.advance(true);
            if prev != TrackingState::Tracking {
                assert_eq!(request, FitRequest::ColdStart);
            }
            sm.complete(call, status);
        }
    }
}
