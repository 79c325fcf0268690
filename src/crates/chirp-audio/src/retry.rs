use std::future::Future;

/// Run fallible async attempts strictly one after another
///
/// Returns the first success; attempts after it are never started. If all
/// of them fail, the errors come back in attempt order.
pub async fn first_success<T, E, I, F, Fut>(attempts: I) -> Result<T, Vec<E>>
where
    I: IntoIterator<Item = F>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut errors = Vec::new();
    for attempt in attempts {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) => errors.push(e),
        }
    }
    Err(errors)
}
