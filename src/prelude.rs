pub use anyhow::{anyhow, bail, Result};
pub use tracing::{debug, error, info, trace, warn};
