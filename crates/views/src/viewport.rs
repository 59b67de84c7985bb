use tokio::sync::watch;

/// Terminals narrower than this many columns get the card layout.
pub const DEFAULT_MOBILE_BREAKPOINT: u16 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    Desktop,
    Mobile,
}

impl LayoutMode {
    pub fn for_width(width: u16, breakpoint: u16) -> Self {
        if width < breakpoint {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }
}

/// Publishing half: whoever measures the terminal pushes widths here.
pub struct ViewportObserver {
    width: watch::Sender<u16>,
    breakpoint: u16,
}

impl ViewportObserver {
    pub fn new(initial_width: u16, breakpoint: u16) -> Self {
        let (width, _) = watch::channel(initial_width);
        Self { width, breakpoint }
    }

    /// Records a new width; returns whether it differed from the last one.
    pub fn publish(&self, width: u16) -> bool {
        self.width.send_if_modified(|current| {
            if *current == width {
                return false;
            }
            *current = width;
            true
        })
    }

    pub fn watch(&self) -> ViewportWatch {
        ViewportWatch {
            width: self.width.subscribe(),
            breakpoint: self.breakpoint,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewportWatch {
    width: watch::Receiver<u16>,
    breakpoint: u16,
}

impl ViewportWatch {
    pub fn width(&self) -> u16 {
        *self.width.borrow()
    }

    pub fn layout(&self) -> LayoutMode {
        LayoutMode::for_width(self.width(), self.breakpoint)
    }

    pub fn is_mobile(&self) -> bool {
        self.layout() == LayoutMode::Mobile
    }

    /// Resolves on the next published width. `None` once the observer is gone.
    pub async fn changed(&mut self) -> Option<LayoutMode> {
        self.width.changed().await.ok()?;
        let width = *self.width.borrow_and_update();
        Some(LayoutMode::for_width(width, self.breakpoint))
    }
}
