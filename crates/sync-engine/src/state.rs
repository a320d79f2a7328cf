// crates/sync-engine/src/state.rs
//! Reading list positions from the remote state document

use crate::endpoint::RemoteEndpoint;
use crate::error::SyncResult;
use crate::types::{Operation, PlaylistTarget, Position};
use playsync_network::Client;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Looks up where an item currently sits in a remote list
///
/// The state document is fetched fresh on every lookup.
#[derive(Clone)]
pub struct RemoteStateReader {
    client: Client,
    endpoint: RemoteEndpoint,
}

impl RemoteStateReader {
    pub fn new(client: Client, endpoint: RemoteEndpoint) -> Self {
        Self { client, endpoint }
    }

    /// Fetches the raw state document
    pub async fn fetch_state(&self) -> SyncResult<String> {
        let url = self.endpoint.state_url();
        log::debug!("{} {}", Operation::StateRead, url);
        Ok(self.client.get_text(&url).await?)
    }

    /// Returns the 1-based position of `target.item` in `target.bucket`
    ///
    /// A failed state read is logged and treated as "not present".
    pub async fn locate(&self, target: &PlaylistTarget) -> Option<Position> {
        match self.fetch_state().await {
            Ok(document) => find_position(&document, &target.bucket, &target.item),
            Err(e) => {
                log::error!("Error getting list items for \"{}\": {}", target.bucket, e);
                None
            }
        }
    }
}

/// Finds the first `<item>` of the `<input>` titled `bucket` whose text
/// contains `item`
///
/// Items are counted from 1 in document order. Malformed XML that ends the
/// scan early yields `None` for anything not matched before the error.
pub fn find_position(document: &str, bucket: &str, item: &str) -> Option<Position> {
    let mut reader = Reader::from_str(document);
    reader.config_mut().trim_text(true);

    let mut input_depth = 0usize;
    let mut in_matching_input = false;
    let mut in_list = false;
    let mut in_item = false;
    let mut index = 0usize;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"input" => {
                    input_depth += 1;
                    if input_depth == 1 {
                        in_matching_input = has_title(&e, bucket);
                        index = 0;
                    }
                }
                b"list" if in_matching_input => in_list = true,
                b"item" if in_list => {
                    in_item = true;
                    text.clear();
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"item" && in_list {
                    index += 1;
                    if item.is_empty() {
                        return Position::new(index);
                    }
                }
            }
            Ok(Event::Text(e)) if in_item => match e.unescape() {
                Ok(value) => text.push_str(&value),
                Err(err) => {
                    log::debug!("Unreadable item text in \"{}\": {}", bucket, err);
                }
            },
            Ok(Event::CData(e)) if in_item => {
                text.push_str(&String::from_utf8_lossy(&e));
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"item" if in_item => {
                    in_item = false;
                    index += 1;
                    if text.contains(item) {
                        return Position::new(index);
                    }
                }
                b"list" if in_list => in_list = false,
                b"input" => {
                    input_depth = input_depth.saturating_sub(1);
                    if input_depth == 0 {
                        in_matching_input = false;
                        in_list = false;
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => return None,
            Err(e) => {
                log::warn!(
                    "Malformed state document at byte {}: {}",
                    reader.buffer_position(),
                    e
                );
                return None;
            }
            _ => {}
        }
    }
}

fn has_title(element: &BytesStart<'_>, bucket: &str) -> bool {
    match element.try_get_attribute("title") {
        Ok(Some(attr)) => attr
            .unescape_value()
            .map(|title| title == bucket)
            .unwrap_or(false),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATE: &str = r#"<vmix>
  <version>27.0.0.49</version>
  <inputs>
    <input key="a1" number="1" type="VideoList" title="server1" state="Paused">
      server1
      <list>
        <item>/media/server1/x.mp4</item>
        <item selected="true">/media/server1/y.mp4</item>
        <item>/media/server1/z.mp4</item>
      </list>
    </input>
    <input key="b2" number="2" type="VideoList" title="server2">
      <list>
        <item>/media/server2/y.mp4</item>
      </list>
    </input>
  </inputs>
</vmix>"#;

    fn position(n: usize) -> Option<Position> {
        Position::new(n)
    }

    #[test]
    fn test_finds_position_in_matching_input() {
        assert_eq!(
            find_position(STATE, "server1", "/media/server1/y.mp4"),
            position(2)
        );
        assert_eq!(
            find_position(STATE, "server1", "/media/server1/x.mp4"),
            position(1)
        );
        assert_eq!(
            find_position(STATE, "server2", "/media/server2/y.mp4"),
            position(1)
        );
    }

    #[test]
    fn test_missing_item_is_none() {
        assert_eq!(find_position(STATE, "server1", "/media/server1/w.mp4"), None);
    }

    #[test]
    fn test_missing_bucket_is_none() {
        assert_eq!(find_position(STATE, "server3", "/media/server1/x.mp4"), None);
    }

    #[test]
    fn test_items_of_other_inputs_are_not_matched() {
        assert_eq!(find_position(STATE, "server2", "/media/server1/x.mp4"), None);
    }

    #[test]
    fn test_substring_match_returns_first() {
        let doc = r#"<vmix><inputs><input title="cam"><list>
            <item>/m/cam/a.mp4.bak</item>
            <item>/m/cam/a.mp4</item>
        </list></input></inputs></vmix>"#;
        assert_eq!(find_position(doc, "cam", "/m/cam/a.mp4"), position(1));
    }

    #[test]
    fn test_escaped_text_is_unescaped() {
        let doc = r#"<vmix><inputs><input title="Tom &amp; Jerry"><list>
            <item>/m/Tom &amp; Jerry/a.mp4</item>
        </list></input></inputs></vmix>"#;
        assert_eq!(
            find_position(doc, "Tom & Jerry", "/m/Tom & Jerry/a.mp4"),
            position(1)
        );
    }

    #[test]
    fn test_empty_items_are_counted() {
        let doc = r#"<vmix><inputs><input title="cam"><list>
            <item/>
            <item>/m/cam/b.mp4</item>
        </list></input></inputs></vmix>"#;
        assert_eq!(find_position(doc, "cam", "/m/cam/b.mp4"), position(2));
    }

    #[test]
    fn test_malformed_document_is_none() {
        assert_eq!(find_position("<vmix><inputs><input title=", "cam", "a"), None);
        assert_eq!(find_position("", "cam", "a"), None);
    }
}
