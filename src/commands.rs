//! Subcommand dispatch and output formatting.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::debug;

use utorrent_webapi::{
    Action, ClientSettings, ConnectionParams, RequestResult, Torrent, TorrentFileList,
    TorrentProperties, UTorrentClient,
};

use crate::app_config::FileConfig;
use crate::cli::{Command, ConnectionArgs};

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 8080;

/// Merges CLI flags over file config over built-in defaults.
pub fn connection_params(
    flags: &ConnectionArgs,
    file: Option<&FileConfig>,
) -> Result<ConnectionParams> {
    let file = file.cloned().unwrap_or_default();

    let host = flags
        .host
        .clone()
        .or(file.host)
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = flags.port.or(file.port).unwrap_or(DEFAULT_PORT);
    let mut params = ConnectionParams::new(host, port);

    if let Some(scheme) = flags.scheme.clone().or(file.scheme) {
        params = params.with_scheme(scheme);
    }
    if let Some(secs) = file.connect_timeout_secs {
        params = params.with_connect_timeout_secs(secs);
    }
    if let Some(secs) = file.read_timeout_secs {
        params = params.with_read_timeout_secs(secs);
    }

    let username = flags.username.clone().or(file.username);
    let password = flags.password.clone().or(file.password);
    match (username, password) {
        (Some(username), password) => {
            params = params.with_credentials(username, password.unwrap_or_default());
        }
        (None, Some(_)) => bail!("--password requires --username"),
        (None, None) => {}
    }

    params.validate().context("Invalid connection settings")?;
    Ok(params)
}

/// Runs one subcommand against the daemon and prints the result.
pub async fn run(command: Command, params: &ConnectionParams, json: bool) -> Result<()> {
    let mut client = UTorrentClient::new(params).context("Failed to create uTorrent client")?;
    debug!(?command, "Dispatching command");

    match command {
        Command::List => {
            let mut torrents = client.get_all_torrents().await?;
            torrents.sort_by(|a, b| (a.queue_order, &a.name).cmp(&(b.queue_order, &b.name)));
            print_torrents(&torrents, json)?;
        }
        Command::Get {
            hash,
            retries,
            delay_ms,
        } => {
            let torrent = if retries == 0 {
                client
                    .get_torrent(&hash)
                    .await?
                    .with_context(|| format!("Torrent {hash} not found"))?
            } else {
                client
                    .get_torrent_with_retry(&hash, Duration::from_millis(delay_ms), retries)
                    .await?
            };
            print_torrents(std::slice::from_ref(&torrent), json)?;
        }
        Command::Start { hashes } => hash_action(&mut client, Action::Start, &hashes, json).await?,
        Command::Stop { hashes } => hash_action(&mut client, Action::Stop, &hashes, json).await?,
        Command::Pause { hashes } => hash_action(&mut client, Action::Pause, &hashes, json).await?,
        Command::ForceStart { hashes } => {
            hash_action(&mut client, Action::ForceStart, &hashes, json).await?;
        }
        Command::Unpause { hashes } => {
            hash_action(&mut client, Action::Unpause, &hashes, json).await?;
        }
        Command::Recheck { hashes } => {
            hash_action(&mut client, Action::Recheck, &hashes, json).await?;
        }
        Command::Remove { hashes } => {
            hash_action(&mut client, Action::Remove, &hashes, json).await?;
        }
        Command::RemoveData { hashes } => {
            hash_action(&mut client, Action::RemoveData, &hashes, json).await?;
        }
        Command::QueueTop { hashes } => {
            hash_action(&mut client, Action::QueueTop, &hashes, json).await?;
        }
        Command::QueueUp { hashes } => {
            hash_action(&mut client, Action::QueueUp, &hashes, json).await?;
        }
        Command::QueueDown { hashes } => {
            hash_action(&mut client, Action::QueueDown, &hashes, json).await?;
        }
        Command::QueueBottom { hashes } => {
            hash_action(&mut client, Action::QueueBottom, &hashes, json).await?;
        }
        Command::AddUrl { uri } => {
            let result = if uri.starts_with("magnet:") {
                client.add_torrent_magnet(&uri).await?
            } else {
                client.add_torrent_uri(&uri).await?
            };
            report(Action::AddUrl, result, json)?;
        }
        Command::AddFile { path } => {
            let result = client
                .add_torrent_file(&path)
                .await
                .with_context(|| format!("Failed to upload '{}'", path.display()))?;
            report(Action::AddFile, result, json)?;
        }
        Command::Files { hash } => {
            let files = client
                .get_torrent_files_for(&hash)
                .await?
                .with_context(|| format!("No file list for torrent {hash}"))?;
            print_files(&files, json)?;
        }
        Command::Props { hash } => {
            let props = client
                .get_torrent_properties_for(&hash)
                .await?
                .with_context(|| format!("No properties for torrent {hash}"))?;
            print_properties(&props, json)?;
        }
        Command::Settings => {
            let settings = client.get_client_settings().await?;
            print_settings(&settings, json)?;
        }
        Command::SetSetting { name, value } => {
            let result = client.set_client_setting(&name, &value).await?;
            report(Action::SetSetting, result, json)?;
        }
        Command::SetPriority {
            hash,
            priority,
            indices,
        } => {
            let result = client
                .set_torrent_file_priority(&hash, priority, &indices)
                .await?;
            report(Action::SetPriority, result, json)?;
        }
    }
    Ok(())
}

async fn hash_action(
    client: &mut UTorrentClient,
    action: Action,
    hashes: &[String],
    json: bool,
) -> Result<()> {
    let result = client.torrent_action(action, hashes).await?;
    report(action, result, json)
}

#[derive(Serialize)]
struct ActionReport {
    action: &'static str,
    result: RequestResult,
}

/// Prints the outcome; a logical `Fail` becomes an error so the exit code is non-zero.
fn report(action: Action, result: RequestResult, json: bool) -> Result<()> {
    if json {
        print_json(&ActionReport {
            action: action.as_str(),
            result,
        })?;
    } else if result.is_success() {
        println!("{action}: ok");
    }
    if !result.is_success() {
        bail!("Daemon did not accept '{action}'");
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_torrents(torrents: &[Torrent], json: bool) -> Result<()> {
    if json {
        return print_json(torrents);
    }
    if torrents.is_empty() {
        println!("No torrents");
        return Ok(());
    }
    for torrent in torrents {
        println!(
            "{}  {:>5.1}%  {:<28}  {}",
            torrent.hash,
            torrent.progress_percent(),
            torrent.status.to_string(),
            torrent.name
        );
    }
    Ok(())
}

fn print_files(files: &TorrentFileList, json: bool) -> Result<()> {
    if json {
        return print_json(files);
    }
    for (index, file) in files.files.iter().enumerate() {
        let priority = file
            .priority
            .map_or_else(|| "?".to_string(), |priority| priority.to_string());
        println!(
            "{index:>4}  {priority:<6}  {:>14}/{:<14}  {}",
            file.downloaded, file.size, file.name
        );
    }
    Ok(())
}

fn print_properties(props: &TorrentProperties, json: bool) -> Result<()> {
    if json {
        return print_json(props);
    }
    println!("hash           {}", props.hash);
    println!("upload_rate    {}", props.upload_rate);
    println!("download_rate  {}", props.download_rate);
    println!("upload_slots   {}", props.upload_slots);
    println!("seed_ratio     {}", props.seed_ratio);
    println!("seed_time      {}", props.seed_time);
    println!("superseed      {:?}", props.superseed);
    println!("dht            {:?}", props.dht);
    println!("pex            {:?}", props.pex);
    println!("seed_override  {:?}", props.seed_override);
    for tracker in &props.trackers {
        println!("tracker        {tracker}");
    }
    Ok(())
}

fn print_settings(settings: &ClientSettings, json: bool) -> Result<()> {
    let mut sorted: Vec<_> = settings.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));
    if json {
        return print_json(&sorted);
    }
    for setting in sorted {
        println!("{} = {}", setting.name, setting.value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_file_config() {
        let flags = ConnectionArgs {
            host: Some("cli-host".to_string()),
            ..ConnectionArgs::default()
        };
        let file = FileConfig {
            host: Some("file-host".to_string()),
            port: Some(9000),
            scheme: Some("https".to_string()),
            ..FileConfig::default()
        };

        let params = connection_params(&flags, Some(&file)).unwrap();
        assert_eq!(params.host(), "cli-host");
        assert_eq!(params.port(), 9000);
        assert_eq!(params.scheme(), "https");
    }

    #[test]
    fn test_defaults_without_config() {
        let params = connection_params(&ConnectionArgs::default(), None).unwrap();
        assert_eq!(params.host(), DEFAULT_HOST);
        assert_eq!(params.port(), DEFAULT_PORT);
        assert!(params.credentials().is_none());
    }

    #[test]
    fn test_password_without_username_rejected() {
        let flags = ConnectionArgs {
            password: Some("x".to_string()),
            ..ConnectionArgs::default()
        };
        assert!(connection_params(&flags, None).is_err());
    }

    #[test]
    fn test_file_credentials_used_when_flags_absent() {
        let file = FileConfig {
            username: Some("admin".to_string()),
            password: Some("pw".to_string()),
            ..FileConfig::default()
        };
        let params = connection_params(&ConnectionArgs::default(), Some(&file)).unwrap();
        assert!(params.credentials().is_some());
    }

    #[test]
    fn test_report_fail_is_error() {
        assert!(report(Action::Start, RequestResult::Success, false).is_ok());
        assert!(report(Action::Start, RequestResult::Fail, false).is_err());
    }
}
