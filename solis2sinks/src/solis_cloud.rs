use std::time::Duration;

use chrono::Utc;
use log::{debug, info};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde_derive::Serialize;

use crate::error::{FetchError, ParseError};
use crate::signer::{self, Credentials};
use crate::station_record::StationListResponse;

pub static DEFAULT_API_URL: &str = "https://soliscloud.com:13333";
pub static STATION_LIST_PATH: &str = "/v1/api/userStationList";

static REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum NetworkState {
    Unknown,
    Online,
    Offline,
}

// only the first page is ever requested
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StationListRequest {
    page_no: u32,
    page_size: u32,
}

/// Anything that can produce a station list, once per cycle.
pub trait StationSource {
    fn fetch_station_list(&mut self) -> Result<StationListResponse, FetchError>;
}

/// Signed HTTP client for the SolisCloud platform API.
pub struct SolisCloud {
    base_url: String,
    credentials: Credentials,
    client: Client,
    state: NetworkState,
}

impl SolisCloud {
    pub fn new(base_url: &str, credentials: Credentials) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        info!("SolisCloud API: {base_url}");
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            client,
            state: NetworkState::Unknown,
        })
    }

    pub fn state(&self) -> NetworkState {
        self.state
    }

    fn set_state(&mut self, new_state: NetworkState) {
        if self.state != new_state {
            self.state = new_state;
            info!("SolisCloud is {new_state:?}");
        }
    }

    fn request(&self) -> Result<Vec<u8>, FetchError> {
        let body = serde_json::to_vec(&StationListRequest {
            page_no: 1,
            page_size: 10,
        })
        .map_err(ParseError::from)?;
        let headers = signer::sign(&self.credentials, STATION_LIST_PATH, &body, Utc::now())?;

        let response = self
            .client
            .post(format!("{}{}", self.base_url, STATION_LIST_PATH))
            .header(CONTENT_TYPE, "application/json;charset=UTF-8")
            .header("Content-MD5", headers.content_md5)
            .header("Date", headers.date)
            .header("Authorization", headers.authorization)
            .body(body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        Ok(response.bytes()?.to_vec())
    }
}

impl StationSource for SolisCloud {
    fn fetch_station_list(&mut self) -> Result<StationListResponse, FetchError> {
        let body = match self.request() {
            Ok(body) => body,
            Err(e) => {
                debug!("{e}");
                self.set_state(NetworkState::Offline);
                return Err(e);
            }
        };
        self.set_state(NetworkState::Online);
        debug!("station list: {}", String::from_utf8_lossy(&body));

        Ok(StationListResponse::from_slice(&body)?)
    }
}
