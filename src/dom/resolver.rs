use crate::browser::page::{ElementHandle, Page, Scope};
use crate::dom::locator::LocatorStrategy;
use crate::error::{BrowserError, Result};
use std::time::Duration;

/// Element found by [`resolve`] together with the strategy that found it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub element: ElementHandle,
    /// Position of the winning strategy in the list
    pub strategy_index: usize,
    pub strategy: LocatorStrategy,
}

/// Try a single strategy
pub fn attempt<P: Page>(page: &P, scope: &Scope, strategy: &LocatorStrategy) -> Result<Option<ElementHandle>> {
    match strategy {
        LocatorStrategy::Text { candidates, matcher, closest } => {
            let Some(found) = resolve_by_visible_text(page, scope, candidates, |text| matcher.matches(text))? else {
                return Ok(None);
            };
            match closest {
                Some(selector) => page.closest(&found, selector),
                None => Ok(Some(found)),
            }
        }
        structural => match structural.to_css() {
            Some(selector) => page.query(scope, &selector),
            None => Ok(None),
        },
    }
}

/// Return the first element found by `strategies`, tried in order.
///
/// A strategy that errors (malformed selector, stale document) counts as a
/// miss. `None` means every strategy missed.
pub fn resolve<P: Page>(page: &P, scope: &Scope, strategies: &[LocatorStrategy]) -> Option<Resolved> {
    for (strategy_index, strategy) in strategies.iter().enumerate() {
        match attempt(page, scope, strategy) {
            Ok(Some(element)) => {
                log::debug!("Resolved {} in {}", strategy.describe(), scope.label());
                return Some(Resolved { element, strategy_index, strategy: strategy.clone() });
            }
            Ok(None) => log::debug!("No match for {} in {}", strategy.describe(), scope.label()),
            Err(e) => log::debug!("Strategy {} failed in {}: {}", strategy.describe(), scope.label(), e),
        }
    }
    None
}

/// First element matched by `candidates` whose text satisfies `predicate`
pub fn resolve_by_visible_text<P, F>(page: &P, scope: &Scope, candidates: &str, predicate: F) -> Result<Option<ElementHandle>>
where
    P: Page,
    F: Fn(&str) -> bool,
{
    Ok(page
        .query_all(scope, candidates)?
        .into_iter()
        .find(|element| predicate(&element.text)))
}

/// Like [`resolve`], but keep retrying until `timeout` has elapsed
pub fn resolve_within<P: Page>(
    page: &P,
    scope: &Scope,
    strategies: &[LocatorStrategy],
    timeout: Duration,
    poll: Duration,
) -> Option<Resolved> {
    wait_until(page, timeout, poll, || resolve(page, scope, strategies))
}

/// [`resolve`] for steps that cannot continue without the element
pub fn require<P: Page>(page: &P, scope: &Scope, strategies: &[LocatorStrategy], target: &str) -> Result<Resolved> {
    resolve(page, scope, strategies).ok_or_else(|| BrowserError::SelectorsExhausted { target: target.to_string() })
}

/// Run `probe` until it yields a value or `timeout` worth of poll delays
/// has been spent. The probe always runs at least once.
pub fn wait_until<P, T, F>(page: &P, timeout: Duration, poll: Duration, mut probe: F) -> Option<T>
where
    P: Page,
    F: FnMut() -> Option<T>,
{
    let poll = poll.max(Duration::from_millis(1));
    let mut waited = Duration::ZERO;

    loop {
        if let Some(found) = probe() {
            return Some(found);
        }
        if waited >= timeout {
            return None;
        }
        let step = poll.min(timeout - waited);
        page.settle(step);
        waited += step;
    }
}
