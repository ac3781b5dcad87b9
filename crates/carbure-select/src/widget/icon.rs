//! Icons passed to widgets.
//!
//! A widget accepting an icon takes either a component, rendered with the
//! widget's own props, or an element the caller already built.

/// Standard icon sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IconSize {
    Xs,
    Sm,
    #[default]
    Md,
    Lg,
}

impl IconSize {
    /// Size in logical pixels.
    pub fn px(self) -> u32 {
        match self {
            Self::Xs => 12,
            Self::Sm => 16,
            Self::Md => 20,
            Self::Lg => 24,
        }
    }
}

/// Props handed to an icon component.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IconProps {
    pub size: IconSize,
    pub color: Option<String>,
    /// Accessible title.
    pub title: Option<String>,
}

impl IconProps {
    pub fn new(size: IconSize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// An icon producing render nodes of type `N`.
#[derive(Debug, Clone)]
pub enum Icon<N> {
    /// Rendered on demand with the caller's props.
    Component(fn(&IconProps) -> N),
    /// Already rendered; props are ignored.
    Element(N),
}

impl<N: Clone> Icon<N> {
    /// Produce the render node for `props`.
    pub fn render(&self, props: &IconProps) -> N {
        match self {
            Self::Component(component) => component(props),
            Self::Element(element) => element.clone(),
        }
    }
}

impl<N> From<fn(&IconProps) -> N> for Icon<N> {
    fn from(component: fn(&IconProps) -> N) -> Self {
        Self::Component(component)
    }
}
