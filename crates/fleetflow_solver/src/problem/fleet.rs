/// Vehicle fleet of a request. More vehicles than destinations is allowed;
/// the surplus vehicles end up with empty routes.
#[derive(Clone, Copy, Debug)]
pub struct FleetSpec {
    pub vehicle_count: usize,
}

impl FleetSpec {
    pub fn new(vehicle_count: usize) -> Self {
        Self { vehicle_count }
    }
}
