use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use visiontrade_core::market::entity::NewsItem;
use visiontrade_core::market::error::MarketError;
use visiontrade_core::market::port::NewsSource;

/// # Summary
/// 基于 RSS 的市场新闻数据源。
///
/// # Invariants
/// - 每次抓取最多返回 `limit` 条，顺序与 RSS 中一致。
/// - 所有条目的来源标签统一为 `source_label`。
pub struct RssNewsSource {
    client: Client,
    url: String,
    source_label: String,
    limit: usize,
}

impl RssNewsSource {
    pub fn new(
        url: impl Into<String>,
        source_label: impl Into<String>,
        limit: usize,
        timeout: Duration,
    ) -> Result<Self, MarketError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MarketError::Network(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
            source_label: source_label.into(),
            limit,
        })
    }
}

#[derive(Clone, Copy)]
enum Field {
    Title,
    Link,
    PubDate,
}

#[derive(Default)]
struct PendingItem {
    title: String,
    link: String,
    pub_date: String,
}

/// # Summary
/// 解析 RSS 2.0 文档中的 `<item>` 条目。
///
/// # Logic
/// 1. 仅在 `<item>` 内部收集 title / link / pubDate 文本 (含 CDATA)。
/// 2. 缺少标题或链接的条目被丢弃。
/// 3. pubDate 按 RFC 2822 解析，失败时留空。
/// 4. 收满 `limit` 条后立即返回。
///
/// # Returns
/// XML 不合法时返回 `MarketError::Parse`。
pub fn parse_rss(
    xml: &str,
    source_label: &str,
    limit: usize,
) -> Result<Vec<NewsItem>, MarketError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut current: Option<PendingItem> = None;
    let mut field: Option<Field> = None;

    while items.len() < limit {
        let event = reader
            .read_event()
            .map_err(|e| MarketError::Parse(format!("rss: {}", e)))?;
        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"item" => current = Some(PendingItem::default()),
                b"title" => field = Some(Field::Title),
                b"link" => field = Some(Field::Link),
                b"pubDate" => field = Some(Field::PubDate),
                _ => field = None,
            },
            Event::Text(t) => {
                let text = t
                    .unescape()
                    .map_err(|e| MarketError::Parse(format!("rss: {}", e)))?;
                append(&mut current, field, &text);
            }
            Event::CData(c) => {
                let raw = c.into_inner();
                append(&mut current, field, &String::from_utf8_lossy(&raw));
            }
            Event::End(e) => {
                field = None;
                if e.name().as_ref() != b"item" {
                    continue;
                }
                match current.take() {
                    Some(item) if !item.title.is_empty() && !item.link.is_empty() => {
                        items.push(NewsItem {
                            title: item.title,
                            link: item.link,
                            source: source_label.to_string(),
                            published_at: DateTime::parse_from_rfc2822(&item.pub_date)
                                .ok()
                                .map(|d| d.with_timezone(&Utc)),
                        });
                    }
                    _ => debug!("Dropping RSS item without title or link"),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(items)
}

fn append(current: &mut Option<PendingItem>, field: Option<Field>, text: &str) {
    let (Some(item), Some(field)) = (current.as_mut(), field) else {
        return;
    };
    let target = match field {
        Field::Title => &mut item.title,
        Field::Link => &mut item.link,
        Field::PubDate => &mut item.pub_date,
    };
    target.push_str(text.trim());
}

#[async_trait]
impl NewsSource for RssNewsSource {
    async fn fetch_news(&self) -> Result<Vec<NewsItem>, MarketError> {
        let resp = self.client.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                MarketError::Timeout(format!("news: {}", e))
            } else {
                MarketError::Network(e.to_string())
            }
        })?;

        if !resp.status().is_success() {
            return Err(MarketError::Network(format!("HTTP {}", resp.status())));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;
        let items = parse_rss(&body, &self.source_label, self.limit)?;
        debug!("Fetched {} news items from {}", items.len(), self.url);
        Ok(items)
    }
}
