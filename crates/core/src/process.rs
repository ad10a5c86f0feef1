//! 처리 단계 trait -- 이벤트 변환 확장 포인트 정의

use crate::error::RawsigError;
use crate::event::SignalEvent;
use crate::observable::ObservableSet;

/// 이벤트를 변환하는 처리 단계
///
/// 새로운 처리 단계를 추가하려면 이 trait을 구현합니다.
/// 처리 단계는 이벤트의 소유권을 받아 (새) 이벤트를 돌려주며,
/// 처리 중 계산한 관측량은 `observables`에 기록합니다.
pub trait EventProcess: Send {
    /// 인스턴스 이름 (관측량 접두어로 사용, 예: "veto")
    fn name(&self) -> &str;

    /// 처리 단계 종류 (설정 섹션 이름, 예: "veto_analysis")
    fn kind(&self) -> &'static str;

    /// 이벤트를 처리합니다.
    ///
    /// `Ok(None)`은 이 단계가 이벤트를 버렸다는 뜻입니다.
    fn process_event(
        &mut self,
        event: SignalEvent,
        observables: &mut ObservableSet,
    ) -> Result<Option<SignalEvent>, RawsigError>;
}

impl<P: EventProcess + ?Sized> EventProcess for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn kind(&self) -> &'static str {
        (**self).kind()
    }

    fn process_event(
        &mut self,
        event: SignalEvent,
        observables: &mut ObservableSet,
    ) -> Result<Option<SignalEvent>, RawsigError> {
        (**self).process_event(event, observables)
    }
}
