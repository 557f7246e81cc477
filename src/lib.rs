#[cfg(feature = "cli")]
pub mod cli;
pub mod collapse;
pub mod config;
pub mod diagram;
pub mod error;
pub mod events;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod minimap;
pub mod model;
pub mod render;
pub mod text_metrics;
pub mod theme;
pub mod view;

#[cfg(feature = "cli")]
pub use cli::run;
pub use collapse::{CollapseMachine, ToggleOutcome};
pub use config::{Config, DiagramConfig, RenderConfig, load_config};
pub use diagram::{ForestDiagram, InteractionHandler, Scene};
pub use error::{ForestError, Result};
pub use ir::{OperatorInfo, RawNode, parse_plans};
pub use model::{Forest, IdGenerator, NodeId, SequentialIds, TreeNode, build_forest};
pub use view::{Gesture, Transform, Viewport};
