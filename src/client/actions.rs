//! State-changing operations. Each returns a [`RequestResult`] classified by the
//! daemon's success marker.

use std::path::Path;

use tracing::{info, instrument};

use super::{UTorrentClient, action_request};
use crate::action::{
    ACTION_PARAM, Action, FILE_INDEX_PARAM, PRIORITY_PARAM, TORRENT_CONTENT_TYPE, TORRENT_FILE_PART,
    URL_PARAM,
};
use crate::error::ClientError;
use crate::magnet::MagnetLink;
use crate::model::{Priority, RequestResult};
use crate::transport::{ApiRequest, FilePart, HttpMethod, Transport};

/// Setting name parameter for `setsetting`.
const SETTING_NAME_PARAM: &str = "s";
/// Setting value parameter for `setsetting`; pairs with the preceding name.
const SETTING_VALUE_PARAM: &str = "v";

impl<T: Transport> UTorrentClient<T> {
    /// Adds a torrent from a magnet link. The decoded form is sent.
    ///
    /// # Errors
    ///
    /// Invoker errors. A rejected link is `Ok(RequestResult::Fail)`.
    pub async fn add_torrent_url(
        &mut self,
        link: &MagnetLink,
    ) -> Result<RequestResult, ClientError> {
        self.add_torrent_uri(link.as_decoded()).await
    }

    /// Parses `magnet` and adds it like [`UTorrentClient::add_torrent_url`].
    ///
    /// # Errors
    ///
    /// `Magnet` (kind `InvalidInput`) when the link does not parse; nothing is
    /// sent in that case. Otherwise invoker errors.
    pub async fn add_torrent_magnet(&mut self, magnet: &str) -> Result<RequestResult, ClientError> {
        let link = MagnetLink::parse(magnet)?;
        self.add_torrent_url(&link).await
    }

    /// Adds a torrent from any URI the daemon can fetch (magnet or http).
    ///
    /// # Errors
    ///
    /// Invoker errors.
    #[instrument(skip(self))]
    pub async fn add_torrent_uri(&mut self, uri: &str) -> Result<RequestResult, ClientError> {
        let request = ApiRequest::new()
            .param(ACTION_PARAM, Action::AddUrl.as_str())
            .param(URL_PARAM, uri);
        self.invoke_action(request, HttpMethod::Get).await
    }

    /// Uploads a `.torrent` file.
    ///
    /// # Errors
    ///
    /// Invoker errors, including `Request` wrapping an IO error when the file
    /// cannot be read.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn add_torrent_file(&mut self, path: &Path) -> Result<RequestResult, ClientError> {
        let request = ApiRequest::new()
            .param(ACTION_PARAM, Action::AddFile.as_str())
            .file(FilePart::new(TORRENT_FILE_PART, path, TORRENT_CONTENT_TYPE));
        let result = self.invoke_action(request, HttpMethod::Post).await?;
        info!(?result, "Uploaded torrent file");
        Ok(result)
    }

    /// Sends `action` for every hash in one request.
    ///
    /// # Errors
    ///
    /// Invoker errors.
    #[instrument(skip_all, fields(action = %action, count = hashes.len()))]
    pub async fn torrent_action(
        &mut self,
        action: Action,
        hashes: &[impl AsRef<str>],
    ) -> Result<RequestResult, ClientError> {
        self.invoke_action(action_request(action, hashes), HttpMethod::Get)
            .await
    }

    /// # Errors
    ///
    /// Invoker errors.
    pub async fn start(
        &mut self,
        hashes: &[impl AsRef<str>],
    ) -> Result<RequestResult, ClientError> {
        self.torrent_action(Action::Start, hashes).await
    }

    /// # Errors
    ///
    /// Invoker errors.
    pub async fn start_torrent(&mut self, hash: &str) -> Result<RequestResult, ClientError> {
        self.start(&[hash]).await
    }

    /// # Errors
    ///
    /// Invoker errors.
    pub async fn stop(&mut self, hashes: &[impl AsRef<str>]) -> Result<RequestResult, ClientError> {
        self.torrent_action(Action::Stop, hashes).await
    }

    /// # Errors
    ///
    /// Invoker errors.
    pub async fn stop_torrent(&mut self, hash: &str) -> Result<RequestResult, ClientError> {
        self.stop(&[hash]).await
    }

    /// # Errors
    ///
    /// Invoker errors.
    pub async fn pause(
        &mut self,
        hashes: &[impl AsRef<str>],
    ) -> Result<RequestResult, ClientError> {
        self.torrent_action(Action::Pause, hashes).await
    }

    /// # Errors
    ///
    /// Invoker errors.
    pub async fn pause_torrent(&mut self, hash: &str) -> Result<RequestResult, ClientError> {
        self.pause(&[hash]).await
    }

    /// Starts ignoring queue limits.
    ///
    /// # Errors
    ///
    /// Invoker errors.
    pub async fn force_start(
        &mut self,
        hashes: &[impl AsRef<str>],
    ) -> Result<RequestResult, ClientError> {
        self.torrent_action(Action::ForceStart, hashes).await
    }

    /// # Errors
    ///
    /// Invoker errors.
    pub async fn force_start_torrent(&mut self, hash: &str) -> Result<RequestResult, ClientError> {
        self.force_start(&[hash]).await
    }

    /// # Errors
    ///
    /// Invoker errors.
    pub async fn unpause(
        &mut self,
        hashes: &[impl AsRef<str>],
    ) -> Result<RequestResult, ClientError> {
        self.torrent_action(Action::Unpause, hashes).await
    }

    /// # Errors
    ///
    /// Invoker errors.
    pub async fn unpause_torrent(&mut self, hash: &str) -> Result<RequestResult, ClientError> {
        self.unpause(&[hash]).await
    }

    /// Re-verifies downloaded pieces.
    ///
    /// # Errors
    ///
    /// Invoker errors.
    pub async fn recheck(
        &mut self,
        hashes: &[impl AsRef<str>],
    ) -> Result<RequestResult, ClientError> {
        self.torrent_action(Action::Recheck, hashes).await
    }

    /// # Errors
    ///
    /// Invoker errors.
    pub async fn recheck_torrent(&mut self, hash: &str) -> Result<RequestResult, ClientError> {
        self.recheck(&[hash]).await
    }

    /// Removes torrents but keeps their data on disk.
    ///
    /// # Errors
    ///
    /// Invoker errors.
    pub async fn remove(
        &mut self,
        hashes: &[impl AsRef<str>],
    ) -> Result<RequestResult, ClientError> {
        self.torrent_action(Action::Remove, hashes).await
    }

    /// # Errors
    ///
    /// Invoker errors.
    pub async fn remove_torrent(&mut self, hash: &str) -> Result<RequestResult, ClientError> {
        self.remove(&[hash]).await
    }

    /// Removes torrents and deletes their data.
    ///
    /// # Errors
    ///
    /// Invoker errors.
    pub async fn remove_data(
        &mut self,
        hashes: &[impl AsRef<str>],
    ) -> Result<RequestResult, ClientError> {
        self.torrent_action(Action::RemoveData, hashes).await
    }

    /// # Errors
    ///
    /// Invoker errors.
    pub async fn remove_data_torrent(&mut self, hash: &str) -> Result<RequestResult, ClientError> {
        self.remove_data(&[hash]).await
    }

    /// # Errors
    ///
    /// Invoker errors.
    pub async fn queue_top(
        &mut self,
        hashes: &[impl AsRef<str>],
    ) -> Result<RequestResult, ClientError> {
        self.torrent_action(Action::QueueTop, hashes).await
    }

    /// # Errors
    ///
    /// Invoker errors.
    pub async fn queue_top_torrent(&mut self, hash: &str) -> Result<RequestResult, ClientError> {
        self.queue_top(&[hash]).await
    }

    /// # Errors
    ///
    /// Invoker errors.
    pub async fn queue_up(
        &mut self,
        hashes: &[impl AsRef<str>],
    ) -> Result<RequestResult, ClientError> {
        self.torrent_action(Action::QueueUp, hashes).await
    }

    /// # Errors
    ///
    /// Invoker errors.
    pub async fn queue_up_torrent(&mut self, hash: &str) -> Result<RequestResult, ClientError> {
        self.queue_up(&[hash]).await
    }

    /// # Errors
    ///
    /// Invoker errors.
    pub async fn queue_down(
        &mut self,
        hashes: &[impl AsRef<str>],
    ) -> Result<RequestResult, ClientError> {
        self.torrent_action(Action::QueueDown, hashes).await
    }

    /// # Errors
    ///
    /// Invoker errors.
    pub async fn queue_down_torrent(&mut self, hash: &str) -> Result<RequestResult, ClientError> {
        self.queue_down(&[hash]).await
    }

    /// # Errors
    ///
    /// Invoker errors.
    pub async fn queue_bottom(
        &mut self,
        hashes: &[impl AsRef<str>],
    ) -> Result<RequestResult, ClientError> {
        self.torrent_action(Action::QueueBottom, hashes).await
    }

    /// # Errors
    ///
    /// Invoker errors.
    pub async fn queue_bottom_torrent(&mut self, hash: &str) -> Result<RequestResult, ClientError> {
        self.queue_bottom(&[hash]).await
    }

    /// Sets the download priority of files inside one torrent.
    ///
    /// `file_indices` are positions in the torrent's file list.
    ///
    /// # Errors
    ///
    /// Invoker errors.
    #[instrument(skip(self))]
    pub async fn set_torrent_file_priority(
        &mut self,
        hash: &str,
        priority: Priority,
        file_indices: &[usize],
    ) -> Result<RequestResult, ClientError> {
        let request = file_indices.iter().fold(
            action_request(Action::SetPriority, &[hash])
                .param(PRIORITY_PARAM, priority.value().to_string()),
            |request, index| request.param(FILE_INDEX_PARAM, index.to_string()),
        );
        self.invoke_action(request, HttpMethod::Get).await
    }

    /// Changes one daemon setting.
    ///
    /// # Errors
    ///
    /// Invoker errors.
    pub async fn set_client_setting(
        &mut self,
        name: &str,
        value: &str,
    ) -> Result<RequestResult, ClientError> {
        self.set_client_settings(&[(name, value)]).await
    }

    /// Changes several daemon settings in one request.
    ///
    /// # Errors
    ///
    /// Invoker errors.
    #[instrument(skip_all, fields(count = settings.len()))]
    pub async fn set_client_settings(
        &mut self,
        settings: &[(&str, &str)],
    ) -> Result<RequestResult, ClientError> {
        let request = settings.iter().fold(
            ApiRequest::new().param(ACTION_PARAM, Action::SetSetting.as_str()),
            |request, (name, value)| {
                request
                    .param(SETTING_NAME_PARAM, *name)
                    .param(SETTING_VALUE_PARAM, *value)
            },
        );
        self.invoke_action(request, HttpMethod::Get).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::UTorrentClient;
    use crate::action::{ACTION_PARAM, HASH_PARAM, URL_PARAM};
    use crate::error::ErrorKind;
    use crate::magnet::MagnetLink;
    use crate::model::{Priority, RequestResult};
    use crate::testing::ScriptedTransport;
    use crate::transport::HttpMethod;

    const HASH: &str = "C12FE1C06BBA254A9DC9F519B335AA7C1367A88A";

    #[tokio::test]
    async fn test_success_marker_classifies_result() {
        let transport = ScriptedTransport::new();
        transport.push_body("...build 12345...");
        transport.push_body("error");
        transport.push_body("");
        let mut client = UTorrentClient::with_transport(transport);

        assert_eq!(
            client.start_torrent("A").await.unwrap(),
            RequestResult::Success
        );
        assert_eq!(
            client.start_torrent("A").await.unwrap(),
            RequestResult::Fail
        );
        assert_eq!(
            client.start_torrent("A").await.unwrap(),
            RequestResult::Fail
        );
    }

    #[tokio::test]
    async fn test_multi_hash_action_repeats_hash_param() {
        let mut client = UTorrentClient::with_transport(ScriptedTransport::new());

        client.queue_bottom(&["A", "B", "C"]).await.unwrap();

        let requests = client.transport().requests();
        let sent = &requests[0].1;
        assert_eq!(sent.param_value(ACTION_PARAM), Some("queuebottom"));
        assert_eq!(sent.param_values(HASH_PARAM), vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_every_hash_action_uses_its_wire_name() {
        let mut client = UTorrentClient::with_transport(ScriptedTransport::new());
        client.start_torrent("H").await.unwrap();
        client.stop_torrent("H").await.unwrap();
        client.pause_torrent("H").await.unwrap();
        client.force_start_torrent("H").await.unwrap();
        client.unpause_torrent("H").await.unwrap();
        client.recheck_torrent("H").await.unwrap();
        client.remove_torrent("H").await.unwrap();
        client.remove_data_torrent("H").await.unwrap();
        client.queue_top_torrent("H").await.unwrap();
        client.queue_up_torrent("H").await.unwrap();
        client.queue_down_torrent("H").await.unwrap();
        client.queue_bottom_torrent("H").await.unwrap();

        let actions: Vec<String> = client
            .transport()
            .requests()
            .iter()
            .map(|(_, request)| request.param_value(ACTION_PARAM).unwrap().to_string())
            .collect();
        assert_eq!(
            actions,
            vec![
                "start",
                "stop",
                "pause",
                "forcestart",
                "unpause",
                "recheck",
                "remove",
                "removedata",
                "queuetop",
                "queueup",
                "queuedown",
                "queuebottom",
            ]
        );
    }

    #[tokio::test]
    async fn test_set_priority_params() {
        let mut client = UTorrentClient::with_transport(ScriptedTransport::new());

        client
            .set_torrent_file_priority("A", Priority::High, &[0, 3])
            .await
            .unwrap();

        let requests = client.transport().requests();
        let sent = &requests[0].1;
        assert_eq!(sent.param_value(ACTION_PARAM), Some("setprio"));
        assert_eq!(sent.param_value("p"), Some("3"));
        assert_eq!(sent.param_values("f"), vec!["0", "3"]);
        assert_eq!(sent.param_values(HASH_PARAM), vec!["A"]);
    }

    #[tokio::test]
    async fn test_set_settings_pairs_names_and_values() {
        let mut client = UTorrentClient::with_transport(ScriptedTransport::new());

        client
            .set_client_settings(&[("max_ul_rate", "100"), ("dht", "false")])
            .await
            .unwrap();

        let requests = client.transport().requests();
        let sent = &requests[0].1;
        assert_eq!(sent.param_value(ACTION_PARAM), Some("setsetting"));
        assert_eq!(sent.param_values("s"), vec!["max_ul_rate", "dht"]);
        assert_eq!(sent.param_values("v"), vec!["100", "false"]);
    }

    #[tokio::test]
    async fn test_add_magnet_sends_decoded_link() {
        let mut client = UTorrentClient::with_transport(ScriptedTransport::new());
        let link = MagnetLink::builder()
            .hash(HASH)
            .name("Big Buck")
            .build()
            .unwrap();

        client.add_torrent_url(&link).await.unwrap();

        let requests = client.transport().requests();
        let sent = &requests[0].1;
        assert_eq!(sent.param_value(ACTION_PARAM), Some("add-url"));
        assert_eq!(
            sent.param_value(URL_PARAM),
            Some(format!("magnet:?xt=urn:btih:{HASH}&dn=Big Buck").as_str())
        );
    }

    #[tokio::test]
    async fn test_add_magnet_string_is_parsed_before_sending() {
        let mut client = UTorrentClient::with_transport(ScriptedTransport::new());
        let encoded = format!("magnet:?xt=urn:btih:{HASH}&dn=Big+Buck");

        let result = client.add_torrent_magnet(&encoded).await.unwrap();

        assert_eq!(result, RequestResult::Success);
        let requests = client.transport().requests();
        assert_eq!(
            requests[0].1.param_value(URL_PARAM),
            Some(format!("magnet:?xt=urn:btih:{HASH}&dn=Big Buck").as_str())
        );
    }

    #[tokio::test]
    async fn test_malformed_magnet_is_invalid_input_and_not_sent() {
        let mut client = UTorrentClient::with_transport(ScriptedTransport::new());

        let err = client
            .add_torrent_magnet("http://example.com/x.torrent")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let raw = format!("magnet:?xt=urn:btih:{HASH}&tr=not a uri");
        let err = client.add_torrent_magnet(&raw).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(client.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn test_add_file_posts_multipart_part() {
        let mut client = UTorrentClient::with_transport(ScriptedTransport::new());

        client
            .add_torrent_file(std::path::Path::new("/tmp/x.torrent"))
            .await
            .unwrap();

        let requests = client.transport().requests();
        let (method, sent) = &requests[0];
        assert_eq!(*method, HttpMethod::Post);
        assert_eq!(sent.param_value(ACTION_PARAM), Some("add-file"));
        assert_eq!(sent.files()[0].name, "torrent_file");
        assert_eq!(sent.files()[0].content_type, "application/x-bittorrent");
    }

    #[tokio::test]
    async fn test_action_errors_still_propagate() {
        let transport = ScriptedTransport::new();
        transport.push_status(403);
        let mut client = UTorrentClient::with_transport(transport);

        let err = client.stop_torrent("A").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }
}
