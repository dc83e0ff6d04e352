//! One instant's sky for one observer: raw ephemeris output plus the points
//! derived from it.

use crate::bodies::Body;
use crate::chart::derived;
use crate::chart::position::PlanetPosition;
use crate::ephemeris::{GeoLocation, HousePositions, RawPosition, ResilientEphemeris};
use crate::western::houses::resolve_house;

#[derive(Debug, Clone)]
pub struct Sky {
    pub julian_day: f64,
    pub location: GeoLocation,
    bodies: Vec<(Body, RawPosition)>,
    pub houses: HousePositions,
}

/// Query every ephemeris body and the house frame.
pub fn observe_sky(ephemeris: &ResilientEphemeris, julian_day: f64, location: GeoLocation) -> Sky {
    let bodies = Body::ephemeris_bodies()
        .filter_map(|body| ephemeris.position(julian_day, body).map(|raw| (body, raw)))
        .collect();
    Sky {
        julian_day,
        location,
        bodies,
        houses: ephemeris.houses(julian_day, location),
    }
}

impl Sky {
    pub fn raw(&self, body: Body) -> Option<RawPosition> {
        self.bodies
            .iter()
            .find(|(b, _)| *b == body)
            .map(|(_, raw)| *raw)
    }

    /// Longitude and speed for any catalogued body, derived points included.
    pub fn longitude(&self, body: Body) -> Option<(f64, f64)> {
        let houses = &self.houses;
        let fixed = |lon: f64| Some((lon, 0.0));
        match body {
            Body::SouthNode => self
                .raw(Body::NorthNode)
                .map(|n| (derived::south_node(n.lon), n.speed_lon)),
            Body::Ascendant => fixed(houses.ascendant),
            Body::Midheaven => fixed(houses.midheaven),
            Body::Descendant => fixed(derived::descendant(houses.ascendant)),
            Body::ImumCoeli => fixed(derived::imum_coeli(houses.midheaven)),
            Body::Vertex => fixed(houses.vertex),
            Body::EastPoint => fixed(houses.east_point),
            Body::PartOfFortune => {
                let sun = self.raw(Body::Sun)?.lon;
                let moon = self.raw(Body::Moon)?.lon;
                let day = derived::is_day_chart(
                    sun,
                    resolve_house(sun, &houses.cusps),
                    houses.ascendant,
                );
                fixed(derived::part_of_fortune(houses.ascendant, sun, moon, day))
            }
            _ => self.raw(body).map(|r| (r.lon, r.speed_lon)),
        }
    }

    /// Resolve every catalogued body against `cusps`, in catalogue order.
    ///
    /// Pass the sky's own cusps for a natal chart, or a natal chart's cusps to
    /// overlay transiting bodies onto natal houses.
    pub fn positions(&self, cusps: &[f64]) -> Vec<PlanetPosition> {
        Body::ALL
            .into_iter()
            .filter_map(|body| {
                let (lon, speed) = self.longitude(body)?;
                Some(PlanetPosition::from_longitude(body, lon, speed, cusps))
            })
            .collect()
    }
}
