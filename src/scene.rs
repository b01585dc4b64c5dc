//! Scene assembly: typed entity records and their Cesium serialization.
//!
//! The renderer builds an append-only sequence of typed entities (spheres
//! and polylines); nothing downstream mutates or removes an entity. The
//! Cesium `viewer.entities.add(...)` markup is produced only at the output
//! boundary by [`to_cesium_js`], keeping the resolution and encoding logic
//! independent of the rendering markup.

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::cities::CityDetails;
use crate::encode::encode;
use crate::orbit::{SatPosition, ShellConfig};
use crate::timeline::ResolvedPath;
use crate::util_index::{UTIL_INTERVAL, UtilizationIndex};

/// Marker radius for satellite spheres, meters.
const SAT_MARKER_RADIUS_M: f64 = 20_000.0;

/// Fixed neutral style for structural intra-orbit links.
const ORBIT_LINK_WIDTH: f64 = 0.1;
const ORBIT_LINK_ALPHA: f64 = 0.2;

/// Entity color: either a Cesium named color with alpha, or a CSS hex value.
#[derive(Debug, Clone, PartialEq)]
pub enum Color {
    Named { name: &'static str, alpha: f64 },
    Css(String),
}

/// One declaration in the rendered scene.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Sphere {
        lon_deg: f64,
        lat_deg: f64,
        alt_m: f64,
        radius_m: f64,
        color: Color,
    },
    Polyline {
        /// Endpoint coordinates as (lon_deg, lat_deg, alt_m).
        positions: [(f64, f64, f64); 2],
        width: f64,
        color: Color,
    },
}

/// A rendered scene: the entity sequence plus the derived output file name.
#[derive(Debug)]
pub struct Scene {
    pub entities: Vec<Entity>,
    /// `<stem>_<src_city>_<src_node>_<dst_city>_<dst_node>_<query_ms>.html`
    pub out_file_name: String,
}

/// Assembles the scene for one resolved path at one query instant.
pub struct SceneRenderer<'a> {
    pub shell: &'a ShellConfig,
    pub cities: &'a CityDetails,
}

impl SceneRenderer<'_> {
    /// Renders background satellites and orbit links, then the colored hops
    /// of the resolved path.
    ///
    /// Path endpoints (first and last node) are ground stations; their city
    /// names become part of the output file name. Interior hops at positions
    /// `0 < p < len - 2` are drawn with the utilization encoder over the
    /// window `[query_time_ms - UTIL_INTERVAL, query_time_ms)`, taking the
    /// directional maximum of the two travel directions. The exact bound is
    /// `0 < p < len(path) - 2`, matching the trace tooling this replaces;
    /// the hops touching either ground station stay uncolored.
    ///
    /// # Errors
    ///
    /// Fails on a missing utilization bucket, an unknown ground-station id,
    /// or a path node outside the constellation.
    pub fn render(
        &self,
        resolved: &ResolvedPath,
        positions: &[SatPosition],
        index: &UtilizationIndex,
        query_time_ms: u64,
        out_stem: &str,
    ) -> Result<Scene> {
        let mut entities = Vec::new();
        let mut out_name = out_stem.to_string();

        // Background: every satellite as a small fixed marker.
        for p in positions {
            entities.push(Entity::Sphere {
                lon_deg: p.sub_lon_deg,
                lat_deg: p.sub_lat_deg,
                alt_m: p.alt_m,
                radius_m: SAT_MARKER_RADIUS_M,
                color: Color::Named {
                    name: "BLACK",
                    alpha: 1.0,
                },
            });
        }

        // Background: structural intra-orbit topology, neutral translucent.
        for (sat1, sat2) in self.shell.orbit_links() {
            let a = &positions[sat1];
            let b = &positions[sat2];
            entities.push(Entity::Polyline {
                positions: [
                    (a.sub_lon_deg, a.sub_lat_deg, a.alt_m),
                    (b.sub_lon_deg, b.sub_lat_deg, b.alt_m),
                ],
                width: ORBIT_LINK_WIDTH,
                color: Color::Named {
                    name: "GREY",
                    alpha: ORBIT_LINK_ALPHA,
                },
            });
        }

        let path = &resolved.nodes;
        let satellite_count = self.shell.satellite_count() as u32;
        let window_start = query_time_ms.saturating_sub(UTIL_INTERVAL);

        for p in 0..path.len() {
            if p == 0 || p == path.len() - 1 {
                let gs_id = path[p].checked_sub(satellite_count).with_context(|| {
                    format!("path endpoint {} is not a ground station", path[p])
                })?;
                let city = self.cities.get(gs_id)?;
                info!(gs_id, city = %city.name, "Path endpoint");
                out_name = format!("{}_{}_{}", out_name, city.name, path[p]);
            }

            if p > 0 && p + 2 < path.len() {
                let sat1 = path[p] as usize;
                let sat2 = path[p + 1] as usize;
                if sat1 >= positions.len() || sat2 >= positions.len() {
                    bail!("path hop {}-{} outside the constellation", sat1, sat2);
                }

                let utilization = index.hop_utilization(
                    path[p],
                    path[p + 1],
                    window_start,
                    query_time_ms,
                )?;
                let style = encode(utilization);
                debug!(sat1, sat2, utilization, color = %style.color, "Hop encoded");

                let a = &positions[sat1];
                let b = &positions[sat2];
                entities.push(Entity::Polyline {
                    positions: [
                        (a.sub_lon_deg, a.sub_lat_deg, a.alt_m),
                        (b.sub_lon_deg, b.sub_lat_deg, b.alt_m),
                    ],
                    width: style.width,
                    color: Color::Css(style.color),
                });
            }
        }

        let out_file_name = format!("{}_{}.html", out_name, query_time_ms);
        Ok(Scene {
            entities,
            out_file_name,
        })
    }
}

/// Serializes the entity sequence as Cesium `viewer.entities.add` statements.
pub fn to_cesium_js(entities: &[Entity]) -> String {
    let mut out = String::new();
    for entity in entities {
        match entity {
            Entity::Sphere {
                lon_deg,
                lat_deg,
                alt_m,
                radius_m,
                color,
            } => {
                out.push_str(&format!(
                    "var redSphere = viewer.entities.add({{name : '', position: \
                     Cesium.Cartesian3.fromDegrees({}, {}, {}), ellipsoid : {{radii : new \
                     Cesium.Cartesian3({}, {}, {}), material : {},}}}});\n",
                    lon_deg,
                    lat_deg,
                    alt_m,
                    radius_m,
                    radius_m,
                    radius_m,
                    material(color)
                ));
            }
            Entity::Polyline {
                positions,
                width,
                color,
            } => {
                let [(lon1, lat1, alt1), (lon2, lat2, alt2)] = positions;
                out.push_str(&format!(
                    "viewer.entities.add({{name : '', polyline: {{ positions: \
                     Cesium.Cartesian3.fromDegreesArrayHeights([{},{},{},{},{},{}]), width: {}, \
                     arcType: Cesium.ArcType.NONE, material: new \
                     Cesium.PolylineOutlineMaterialProperty({{ color: {}, outlineWidth: 0, \
                     outlineColor: Cesium.Color.BLACK}})}}}});\n",
                    lon1,
                    lat1,
                    alt1,
                    lon2,
                    lat2,
                    alt2,
                    width,
                    material(color)
                ));
            }
        }
    }
    out
}

fn material(color: &Color) -> String {
    match color {
        Color::Named { name, alpha } => format!("Cesium.Color.{}.withAlpha({})", name, alpha),
        Color::Css(hex) => format!("Cesium.Color.fromCssColorString('#{}')", hex),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cities::{CityDetail, CityDetails};
    use crate::util_index::UtilizationSample;

    fn tiny_shell() -> ShellConfig {
        // 3 orbits x 3 satellites: node ids 0..8 are satellites, 9+ ground.
        ShellConfig {
            name: "test_3x3",
            num_orbs: 3,
            num_sats_per_orb: 3,
            inclination_deg: 53.0,
            altitude_m: 550_000.0,
            mean_motion_rev_per_day: 15.19,
            eccentricity: 0.0000001,
            arg_of_perigee_deg: 0.0,
            phase_diff: true,
        }
    }

    fn cities() -> CityDetails {
        CityDetails::from_rows(vec![
            CityDetail {
                id: 0,
                name: "Tokyo".to_string(),
                latitude_deg: 35.68,
                longitude_deg: 139.69,
                elevation_m: 40.0,
            },
            CityDetail {
                id: 3,
                name: "Paris".to_string(),
                latitude_deg: 48.85,
                longitude_deg: 2.35,
                elevation_m: 35.0,
            },
        ])
    }

    fn sample(src: u32, dst: u32, utilization: f64) -> UtilizationSample {
        UtilizationSample {
            src,
            dst,
            start_ms: 0,
            end_ms: 200,
            utilization,
        }
    }

    fn resolved(nodes: &[u32]) -> ResolvedPath {
        ResolvedPath {
            active_since_ms: 0,
            nodes: nodes.to_vec(),
        }
    }

    #[test]
    fn test_render_emits_markers_links_and_hops() {
        let shell = tiny_shell();
        let cities = cities();
        let positions = shell.satellite_positions(200);
        let index = UtilizationIndex::build(&[
            sample(1, 2, 0.8),
            sample(2, 1, 0.3),
            sample(2, 4, 0.5),
            sample(4, 2, 0.1),
        ])
        .unwrap();

        let renderer = SceneRenderer {
            shell: &shell,
            cities: &cities,
        };
        // Path: ground 9 (gs 0) -> sats 1, 2, 4 -> ground 12 (gs 3).
        let scene = renderer
            .render(&resolved(&[9, 1, 2, 4, 12]), &positions, &index, 200, "out/test")
            .unwrap();

        let spheres = scene
            .entities
            .iter()
            .filter(|e| matches!(e, Entity::Sphere { .. }))
            .count();
        assert_eq!(spheres, 9);

        // 9 orbit links plus the two interior hops at p = 1 and p = 2. The
        // ground-station hops at p = 0 and p = 3 are never colored.
        let polylines: Vec<_> = scene
            .entities
            .iter()
            .filter_map(|e| match e {
                Entity::Polyline { width, color, .. } => Some((*width, color.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(polylines.len(), 11);

        let colored: Vec<_> = polylines
            .iter()
            .filter(|(_, c)| matches!(c, Color::Css(_)))
            .collect();
        assert_eq!(colored.len(), 2);
        // Hop (1,2): max(0.8, 0.3) = 0.8 -> width 5, red-dominant.
        assert_eq!(colored[0].0, 5.0);
        assert_eq!(colored[0].1, Color::Css("ff6600".to_string()));
        // Hop (2,4): max(0.5, 0.1) = 0.5 -> amber midpoint.
        assert_eq!(colored[1].0, 3.5);
        assert_eq!(colored[1].1, Color::Css("ffff00".to_string()));
    }

    #[test]
    fn test_render_names_output_after_endpoint_cities() {
        let shell = tiny_shell();
        let cities = cities();
        let positions = shell.satellite_positions(200);
        let index = UtilizationIndex::build(&[
            sample(1, 2, 0.5),
            sample(2, 1, 0.5),
            sample(2, 4, 0.5),
            sample(4, 2, 0.5),
        ])
        .unwrap();

        let renderer = SceneRenderer {
            shell: &shell,
            cities: &cities,
        };
        let scene = renderer
            .render(&resolved(&[9, 1, 2, 4, 12]), &positions, &index, 200, "out/test")
            .unwrap();

        assert_eq!(scene.out_file_name, "out/test_Tokyo_9_Paris_12_200.html");
    }

    #[test]
    fn test_render_propagates_lookup_miss() {
        let shell = tiny_shell();
        let cities = cities();
        let positions = shell.satellite_positions(150);
        let index = UtilizationIndex::build(&[sample(1, 2, 0.8), sample(2, 1, 0.3)]).unwrap();

        let renderer = SceneRenderer {
            shell: &shell,
            cities: &cities,
        };
        // Window [50,150) is not bucket-aligned for samples starting at 0,
        // so the exact-window lookup must fail rather than default.
        let err = renderer
            .render(&resolved(&[9, 1, 2, 4, 12]), &positions, &index, 150, "out/test")
            .unwrap_err();
        assert!(err.to_string().contains("no utilization bucket"));
    }

    #[test]
    fn test_render_rejects_satellite_endpoint() {
        let shell = tiny_shell();
        let cities = cities();
        let positions = shell.satellite_positions(200);
        let index = UtilizationIndex::build(&[]).unwrap();

        let renderer = SceneRenderer {
            shell: &shell,
            cities: &cities,
        };
        // First node is a satellite id, not a ground station.
        let err = renderer
            .render(&resolved(&[1, 2, 12]), &positions, &index, 200, "out/test")
            .unwrap_err();
        assert!(err.to_string().contains("not a ground station"));
    }

    #[test]
    fn test_empty_path_renders_background_only() {
        let shell = tiny_shell();
        let cities = cities();
        let positions = shell.satellite_positions(200);
        let index = UtilizationIndex::build(&[]).unwrap();

        let renderer = SceneRenderer {
            shell: &shell,
            cities: &cities,
        };
        let scene = renderer
            .render(&resolved(&[]), &positions, &index, 200, "out/test")
            .unwrap();

        assert_eq!(scene.entities.len(), 9 + 9);
        assert_eq!(scene.out_file_name, "out/test_200.html");
    }

    #[test]
    fn test_to_cesium_js_named_and_css_materials() {
        let entities = vec![
            Entity::Sphere {
                lon_deg: 10.0,
                lat_deg: 20.0,
                alt_m: 550_000.0,
                radius_m: 20_000.0,
                color: Color::Named {
                    name: "BLACK",
                    alpha: 1.0,
                },
            },
            Entity::Polyline {
                positions: [(10.0, 20.0, 550_000.0), (11.0, 21.0, 550_000.0)],
                width: 5.0,
                color: Color::Css("ff6600".to_string()),
            },
        ];

        let js = to_cesium_js(&entities);
        assert!(js.contains("Cesium.Color.BLACK.withAlpha(1)"));
        assert!(js.contains("Cesium.Cartesian3.fromDegrees(10, 20, 550000)"));
        assert!(js.contains("Cesium.Color.fromCssColorString('#ff6600')"));
        assert!(js.contains("width: 5,"));
        assert_eq!(js.matches("viewer.entities.add").count(), 2);
    }
}
