// src/ingest/providers/weibo.rs
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use metrics::histogram;
use scraper::{Html, Selector};

use crate::ingest::error::ScrapeError;
use crate::ingest::scheduler::SampleJob;
use crate::ingest::types::{Extracted, PageFetcher, TopicPopularity};
use crate::sink::ObservationSink;

pub const SOURCE: &str = "weibo";
pub const WEIBO_URL: &str = "https://s.weibo.com/top/summary";
pub const WEIBO_METRIC: &str = "weibo_hotdata";

/// Rank/topic/popularity cells of the hot-search table.
const CELL_SELECTOR: &str = ".td-02";

/// Derive topic -> popularity from the text of each matched cell.
///
/// The first cell is the pinned "live" entry and carries no number, so it is
/// always dropped. Remaining cells are positional: after removing all
/// whitespace except newlines, field 1 is the topic and field 2 the count.
pub fn topics_from_cells<'a, I>(cells: I) -> Extracted<TopicPopularity>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = TopicPopularity::new();
    let mut short = 0usize;
    let mut unparsed = 0usize;

    for text in cells.into_iter().skip(1) {
        let stripped: String = text
            .chars()
            .filter(|c| *c == '\n' || !c.is_whitespace())
            .collect();
        let fields: Vec<&str> = stripped.split('\n').collect();
        if fields.len() < 3 || fields[1].is_empty() {
            short += 1;
            continue;
        }

        let popularity = fields[2].parse::<u64>().unwrap_or_else(|_| {
            unparsed += 1;
            0
        });
        out.insert(fields[1].to_string(), popularity);
    }

    let error = if short > 0 {
        Some(ScrapeError::Shape(format!(
            "{short} cell(s) without topic/popularity fields"
        )))
    } else if unparsed > 0 {
        Some(ScrapeError::Value(format!(
            "{unparsed} popularity value(s) not a decimal integer"
        )))
    } else {
        None
    };
    Extracted { value: out, error }
}

pub fn parse_trending_topics(body: &[u8]) -> Extracted<TopicPopularity> {
    let selector = match Selector::parse(CELL_SELECTOR) {
        Ok(s) => s,
        Err(e) => return Extracted::failed(ScrapeError::Shape(format!("selector: {e:?}"))),
    };

    let html = String::from_utf8_lossy(body);
    let doc = Html::parse_document(&html);
    let cells: Vec<String> = doc
        .select(&selector)
        .map(|el| el.text().collect::<String>())
        .collect();

    if cells.is_empty() {
        return Extracted::failed(ScrapeError::Shape(format!(
            "no {CELL_SELECTOR} cells on page"
        )));
    }
    topics_from_cells(cells.iter().map(String::as_str))
}

pub async fn acquire(fetcher: &dyn PageFetcher) -> Extracted<TopicPopularity> {
    let body = match fetcher.fetch(WEIBO_URL, &[]).await {
        Ok(b) => b,
        Err(e) => return Extracted::failed(e),
    };

    let t0 = Instant::now();
    let out = parse_trending_topics(&body);
    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("sampler_parse_ms", "source" => SOURCE).record(ms);
    out
}

/// One fetch of the trending-topics page; errors logged, never raised.
pub async fn fetch_trending_topics(fetcher: &dyn PageFetcher) -> TopicPopularity {
    crate::ingest::settle(SOURCE, acquire(fetcher).await)
}

pub fn forward(sink: &dyn ObservationSink, topics: &TopicPopularity) -> usize {
    for (topic, hot) in topics {
        sink.set_gauge(WEIBO_METRIC, &[("topic", topic.as_str())], *hot as f64);
    }
    topics.len()
}

pub struct WeiboJob {
    fetcher: Arc<dyn PageFetcher>,
}

impl WeiboJob {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl SampleJob for WeiboJob {
    fn name(&self) -> &'static str {
        SOURCE
    }

    async fn tick(&self, sink: &dyn ObservationSink) -> Extracted<usize> {
        let got = acquire(self.fetcher.as_ref()).await;
        let n = forward(sink, &got.value);
        Extracted {
            value: n,
            error: got.error,
        }
    }
}
