/// Polygon rasterization mode applied to every mesh draw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RasterMode {
    #[default]
    Fill,
    Wireframe,
}

impl RasterMode {
    #[inline]
    pub fn toggled(self) -> Self {
        match self {
            RasterMode::Fill => RasterMode::Wireframe,
            RasterMode::Wireframe => RasterMode::Fill,
        }
    }

    /// Toggle, except that switching into wireframe needs line rasterization
    /// support. Without it the mode stays as it is.
    #[inline]
    pub fn toggled_if(self, line_supported: bool) -> Self {
        match self.toggled() {
            RasterMode::Wireframe if !line_supported => self,
            next => next,
        }
    }

    #[inline]
    pub fn is_wireframe(self) -> bool {
        matches!(self, RasterMode::Wireframe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_twice_restores_mode() {
        for mode in [RasterMode::Fill, RasterMode::Wireframe] {
            assert_eq!(mode.toggled().toggled(), mode);
            assert_ne!(mode.toggled(), mode);
        }
    }

    #[test]
    fn default_is_filled() {
        assert!(!RasterMode::default().is_wireframe());
    }

    #[test]
    fn supported_toggle_cycles_fill_and_wireframe() {
        let mut mode = RasterMode::default();
        let mut seen = Vec::new();
        for _ in 0..4 {
            mode = mode.toggled_if(true);
            seen.push(mode);
        }
        assert_eq!(
            seen,
            [
                RasterMode::Wireframe,
                RasterMode::Fill,
                RasterMode::Wireframe,
                RasterMode::Fill
            ]
        );
    }

    #[test]
    fn unsupported_toggle_stays_filled() {
        assert_eq!(RasterMode::Fill.toggled_if(false), RasterMode::Fill);
        // leaving wireframe never needs line support
        assert_eq!(RasterMode::Wireframe.toggled_if(false), RasterMode::Fill);
    }
}
