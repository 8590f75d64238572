use log::warn;
use serde_derive::Deserialize;
use serde_json::{Map, Value};

use crate::error::ParseError;

/// Numeric fields of a station record that get forwarded to the sinks.
pub const NUMERIC_FIELDS: [&str; 47] = [
    "all",
    "normal",
    "fault",
    "offline",
    "building",
    "mppt",
    "fullHour",
    "dayPowerGeneration",
    "monthCarbonDioxide",
    "dip",
    "azimuth",
    "power",
    "timeZone",
    "daylight",
    "price",
    "capacity",
    "capacityPercent",
    "dayEnergy",
    "dayIncome",
    "monthEnergy",
    "yearEnergy",
    "allEnergy",
    "allEnergy1",
    "allIncome",
    "updateDate",
    "type",
    "epmType",
    "gridSwitch",
    "gridSwitch1",
    "dcInputType",
    "stationTypeNew",
    "batteryTotalDischargeEnergy",
    "batteryTotalChargeEnergy",
    "gridPurchasedTotalEnergy",
    "gridSellTotalEnergy",
    "homeLoadTotalEnergy",
    "oneSelf",
    "batteryTodayDischargeEnergy",
    "batteryTodayChargeEnergy",
    "gridPurchasedTodayEnergy",
    "gridSellTodayEnergy",
    "homeLoadTodayEnergy",
    "oneSelfTotal",
    "monthEnergy1",
    "dayEnergy1",
    "yearEnergy1",
    "power1",
];

/// Response of `/v1/api/userStationList`. Only the path
/// `data.page.records` is interpreted, everything else is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct StationListResponse {
    #[serde(default)]
    data: Option<StationListData>,
}

#[derive(Debug, Default, Deserialize)]
struct StationListData {
    #[serde(default)]
    page: Option<StationPage>,
}

#[derive(Debug, Default, Deserialize)]
struct StationPage {
    #[serde(default)]
    records: Option<Vec<Map<String, Value>>>,
}

impl StationListResponse {
    pub fn from_slice(body: &[u8]) -> Result<Self, ParseError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// The first station of the list, if the response has one.
    pub fn first_record(&self) -> Option<&Map<String, Value>> {
        self.data.as_ref()?.page.as_ref()?.records.as_ref()?.first()
    }
}

/// Known numeric fields of one station, in `NUMERIC_FIELDS` order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StationRecord {
    fields: Vec<(&'static str, f64)>,
}

impl StationRecord {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.fields.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keep the known numeric fields of a raw record.
    ///
    /// Absent fields are skipped. A value that does not convert to a number
    /// drops only that field.
    pub fn from_raw(raw: &Map<String, Value>) -> Self {
        let fields = NUMERIC_FIELDS
            .iter()
            .filter_map(|&name| {
                let value = raw.get(name)?;
                match to_number(value) {
                    Some(number) => Some((name, number)),
                    None => {
                        warn!("dropping field {name}: {value} is not numeric");
                        None
                    }
                }
            })
            .collect();
        Self { fields }
    }
}

/// Extract the first station of a station list response.
pub fn extract(response: &StationListResponse) -> Result<StationRecord, ParseError> {
    response
        .first_record()
        .map(StationRecord::from_raw)
        .ok_or(ParseError::NoRecord)
}

fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    }
}
