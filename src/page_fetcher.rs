use crate::errors::PipelineError;
use crate::jikan_client::HttpSession;
use crate::models::{Page, PaginationEnvelope};
use log::{info, warn};
use std::time::Duration;
use tokio::time::sleep;

/// Ask the catalog endpoint how many pages it has.
pub async fn get_page_count<S: HttpSession + ?Sized>(
    url: &str,
    session: &S,
) -> Result<u32, PipelineError> {
    let response = session.get(url).await?;
    if !response.is_ok() {
        return Err(PipelineError::StatusError {
            url: url.to_string(),
            status: response.status,
        });
    }
    let envelope: PaginationEnvelope = response.json()?;
    Ok(envelope.pagination.last_visible_page)
}

/// Walk pages `1..=page_count` of the catalog, one request per call to
/// [`AnimePages::next`].
pub fn generate_anime_list<'a, S: HttpSession + ?Sized>(
    session: &'a S,
    base_url: &str,
    page_count: u32,
    delay: Duration,
) -> AnimePages<'a, S> {
    AnimePages {
        session,
        anime_url: format!("{}/anime", base_url.trim_end_matches('/')),
        next_page: 1,
        page_count,
        delay,
        pause_pending: false,
        finished: false,
    }
}

/// Lazy, single-pass sequence of catalog pages.
///
/// Pages answering with anything other than 200 are logged and skipped.
/// After each page is handed out, the next call waits `delay` before doing
/// anything else. Transport or decode failures end the sequence.
pub struct AnimePages<'a, S: HttpSession + ?Sized> {
    session: &'a S,
    anime_url: String,
    next_page: u32,
    page_count: u32,
    delay: Duration,
    pause_pending: bool,
    finished: bool,
}

impl<'a, S: HttpSession + ?Sized> AnimePages<'a, S> {
    pub async fn next(&mut self) -> Option<Result<Page, PipelineError>> {
        if self.finished {
            return None;
        }
        if self.pause_pending {
            self.pause_pending = false;
            sleep(self.delay).await;
        }

        while self.next_page <= self.page_count {
            let page_num = self.next_page;
            self.next_page += 1;

            let url = self.page_url(page_num);
            let response = match self.session.get(&url).await {
                Ok(response) => response,
                Err(e) => return Some(Err(self.finish_with(e))),
            };

            if !response.is_ok() {
                warn!("Error received: {} (page {})", response.status, page_num);
                continue;
            }

            return match response.json::<Page>() {
                Ok(page) => {
                    self.pause_pending = true;
                    Some(Ok(page))
                }
                Err(e) => Some(Err(self.finish_with(e))),
            };
        }

        self.finished = true;
        info!("Finished walking {} pages", self.page_count);
        None
    }

    fn page_url(&self, page_num: u32) -> String {
        format!("{}?page={}&sfw=true", self.anime_url, page_num)
    }

    fn finish_with(&mut self, err: PipelineError) -> PipelineError {
        self.finished = true;
        err
    }
}
