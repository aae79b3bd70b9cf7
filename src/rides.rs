//! Ride resource: listing, creation, and lifecycle transitions.
//!
//! Every call goes through [`Gateway::send`], so an expired access token is refreshed and the
//! call replayed without the caller noticing.

// self
use crate::{
	_prelude::*,
	endpoints,
	gateway::Gateway,
	http::{ApiRequest, HttpTransport},
};

/// Lifecycle status reported by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RideStatus {
	/// Waiting for a driver.
	Requested,
	/// A driver accepted the ride.
	Assigned,
	/// The ride is underway.
	Ongoing,
	/// The ride finished.
	Done,
	/// The ride was cancelled.
	Cancelled,
}

/// Geographic coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
	/// Latitude in degrees.
	pub lat: f64,
	/// Longitude in degrees.
	pub lng: f64,
}
impl GeoPoint {
	/// Creates a coordinate.
	pub const fn new(lat: f64, lng: f64) -> Self {
		Self { lat, lng }
	}
}

/// Ride as returned by the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ride {
	/// Backend identifier.
	pub id: u64,
	/// Requesting client's user id.
	pub client: u64,
	/// Assigned driver's user id.
	#[serde(default)]
	pub driver: Option<u64>,
	/// Pickup coordinate.
	#[serde(default)]
	pub pickup_point: Option<GeoPoint>,
	/// Drop-off coordinate.
	#[serde(default)]
	pub dropoff_point: Option<GeoPoint>,
	/// Human-readable pickup location.
	#[serde(default)]
	pub start_location: Option<String>,
	/// Human-readable drop-off location.
	#[serde(default)]
	pub end_location: Option<String>,
	/// Route length.
	pub distance_km: f64,
	/// Price in the smallest currency unit.
	pub price_cents: i64,
	/// Price in currency units.
	pub price: f64,
	/// Lifecycle status.
	pub status: RideStatus,
	/// When the ride started.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub started_at: Option<OffsetDateTime>,
	/// When the ride finished.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub finished_at: Option<OffsetDateTime>,
	/// Creation timestamp.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	/// Last modification timestamp.
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
}

/// Body for [`Gateway::create_ride`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RideRequest {
	/// Pickup latitude.
	pub pickup_lat: f64,
	/// Pickup longitude.
	pub pickup_lng: f64,
	/// Drop-off latitude.
	pub dropoff_lat: f64,
	/// Drop-off longitude.
	pub dropoff_lng: f64,
}
impl RideRequest {
	/// Builds a request between two points.
	pub fn new(pickup: GeoPoint, dropoff: GeoPoint) -> Self {
		Self {
			pickup_lat: pickup.lat,
			pickup_lng: pickup.lng,
			dropoff_lat: dropoff.lat,
			dropoff_lng: dropoff.lng,
		}
	}
}

/// Lifecycle transitions exposed as `PATCH /rides/{id}/{action}/`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RideAction {
	/// Cancel a requested or assigned ride.
	Cancel,
	/// Mark the ride as started.
	Start,
	/// Mark the ride as finished.
	Finish,
}
impl RideAction {
	/// Returns the path segment for the action.
	pub const fn as_str(self) -> &'static str {
		match self {
			RideAction::Cancel => "cancel",
			RideAction::Start => "start",
			RideAction::Finish => "finish",
		}
	}
}
impl Display for RideAction {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

impl<T> Gateway<T>
where
	T: ?Sized + HttpTransport,
{
	/// Lists the caller's rides.
	pub async fn list_rides(&self) -> Result<Vec<Ride>> {
		self.send(ApiRequest::get(endpoints::RIDES)).await?.error_for_status()?.json()
	}

	/// Requests a new ride.
	pub async fn create_ride(&self, ride: &RideRequest) -> Result<Ride> {
		let request = ApiRequest::post(endpoints::RIDES).json(ride)?;

		self.send(request).await?.error_for_status()?.json()
	}

	/// Cancels a ride.
	pub async fn cancel_ride(&self, id: u64) -> Result<()> {
		self.transition_ride(id, RideAction::Cancel).await
	}

	/// Starts a ride.
	pub async fn start_ride(&self, id: u64) -> Result<()> {
		self.transition_ride(id, RideAction::Start).await
	}

	/// Finishes a ride.
	pub async fn finish_ride(&self, id: u64) -> Result<()> {
		self.transition_ride(id, RideAction::Finish).await
	}

	/// Applies a lifecycle transition; the response body is not interpreted.
	pub async fn transition_ride(&self, id: u64, action: RideAction) -> Result<()> {
		let request = ApiRequest::patch(endpoints::ride_action(id, action.as_str()));

		self.send(request).await?.error_for_status()?;

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn ride_decodes_backend_payload() {
		let ride: Ride = serde_json::from_str(
			r#"{
				"id": 12,
				"client": 3,
				"driver": null,
				"pickup_point": {"lat": 48.85, "lng": 2.35},
				"dropoff_point": {"lat": 48.86, "lng": 2.29},
				"distance_km": 4.2,
				"price_cents": 1260,
				"price": 12.6,
				"status": "requested",
				"started_at": null,
				"created_at": "2026-03-01T09:15:00.123456Z",
				"updated_at": "2026-03-01T09:15:00Z"
			}"#,
		)
		.expect("Ride fixture should decode.");

		assert_eq!(ride.status, RideStatus::Requested);
		assert_eq!(ride.driver, None);
		assert_eq!(ride.pickup_point, Some(GeoPoint::new(48.85, 2.35)));
		assert_eq!(ride.finished_at, None);
		assert_eq!(ride.created_at.year(), 2026);
	}

	#[test]
	fn ride_request_flattens_points() {
		let body = serde_json::to_value(RideRequest::new(
			GeoPoint::new(1.0, 2.0),
			GeoPoint::new(3.0, 4.0),
		))
		.expect("RideRequest should serialize.");

		assert_eq!(
			body,
			serde_json::json!({
				"pickup_lat": 1.0,
				"pickup_lng": 2.0,
				"dropoff_lat": 3.0,
				"dropoff_lng": 4.0,
			})
		);
	}

	#[test]
	fn status_uses_snake_case_wire_names() {
		assert_eq!(
			serde_json::to_string(&RideStatus::Cancelled).expect("Status should serialize."),
			"\"cancelled\""
		);
		assert_eq!(RideAction::Finish.to_string(), "finish");
	}
}
