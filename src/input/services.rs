use crate::error::AppError;

use super::PasteBackDriver;

/// 粘贴最终经由的路径
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteRoute {
    /// 对焦点控件直接调用粘贴
    DirectInvocation,
    /// 模拟系统粘贴快捷键
    SynthesizedChord,
}

/// 把剪贴板内容送达当前焦点
///
/// 先尝试直接调用；不可用或失败时退回模拟快捷键；两者都失败返回
/// `InjectionUnavailable`，内容仍留在剪贴板上供用户手动粘贴。
pub fn deliver_paste(driver: &dyn PasteBackDriver) -> Result<PasteRoute, AppError> {
    match driver.invoke_paste() {
        Ok(true) => {
            log::debug!("已直接调用焦点控件的粘贴");
            return Ok(PasteRoute::DirectInvocation);
        }
        Ok(false) => log::debug!("没有可直接粘贴的焦点控件，改为模拟快捷键"),
        Err(e) => log::debug!("直接粘贴失败，改为模拟快捷键: {}", e),
    }

    match driver.synthesize_paste_chord() {
        Ok(()) => Ok(PasteRoute::SynthesizedChord),
        Err(e) => Err(AppError::InjectionUnavailable(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::input::FocusTarget;

    struct ScriptedDriver {
        direct: Result<bool, ()>,
        chord_ok: bool,
        chords: Cell<u32>,
    }

    impl PasteBackDriver for ScriptedDriver {
        fn capture_focus(&self) -> Option<FocusTarget> {
            None
        }

        fn restore_focus(&self, _target: &FocusTarget) -> Result<(), AppError> {
            Ok(())
        }

        fn invoke_paste(&self) -> Result<bool, AppError> {
            self.direct
                .map_err(|_| AppError::InjectionUnavailable("no responder".into()))
        }

        fn synthesize_paste_chord(&self) -> Result<(), AppError> {
            self.chords.set(self.chords.get() + 1);
            if self.chord_ok {
                Ok(())
            } else {
                Err(AppError::InjectionUnavailable("input blocked".into()))
            }
        }
    }

    fn driver(direct: Result<bool, ()>, chord_ok: bool) -> ScriptedDriver {
        ScriptedDriver {
            direct,
            chord_ok,
            chords: Cell::new(0),
        }
    }

    #[test]
    fn direct_paste_skips_chord() {
        let d = driver(Ok(true), true);
        assert_eq!(deliver_paste(&d).expect("paste"), PasteRoute::DirectInvocation);
        assert_eq!(d.chords.get(), 0);
    }

    #[test]
    fn unaddressable_input_falls_back_to_chord() {
        let d = driver(Ok(false), true);
        assert_eq!(deliver_paste(&d).expect("paste"), PasteRoute::SynthesizedChord);
        assert_eq!(d.chords.get(), 1);
    }

    #[test]
    fn direct_error_falls_back_to_chord() {
        let d = driver(Err(()), true);
        assert_eq!(deliver_paste(&d).expect("paste"), PasteRoute::SynthesizedChord);
    }

    #[test]
    fn both_failing_is_injection_unavailable() {
        let d = driver(Ok(false), false);
        assert!(matches!(deliver_paste(&d), Err(AppError::InjectionUnavailable(_))));
    }
}
