use {
    std::str::FromStr,
    tracing::{
        level_filters::LevelFilter, metadata::ParseLevelFilterError, Event, Level, Metadata,
        Subscriber,
    },
    tracing_subscriber::{layer::Context, Layer},
};

/// Suppresses messages from the HTTP stack below DEBUG level.
///
/// `reqwest` and `hyper` log every connection at INFO or lower, which buries
/// the client's own output when a refresh issues dozens of RPC calls.
pub struct CustomLevelFilter {
    max_level: LevelFilter,
}

impl CustomLevelFilter {
    fn is_noisy(target: &str) -> bool {
        ["reqwest", "hyper", "hyper_util", "h2"]
            .iter()
            .any(|prefix| target.starts_with(prefix))
    }
}

impl<S> Layer<S> for CustomLevelFilter
where
    S: Subscriber,
{
    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        let level = *metadata.level();

        if Self::is_noisy(metadata.target()) {
            let effective_level = if level < Level::DEBUG {
                Level::DEBUG
            } else {
                level
            };

            effective_level <= self.max_level
        } else {
            level <= self.max_level
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        ctx.event(event);
    }
}

impl FromStr for CustomLevelFilter {
    type Err = ParseLevelFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let max_level = s.parse()?;

        Ok(Self { max_level })
    }
}

// ----------------------------------- tests -----------------------------------
