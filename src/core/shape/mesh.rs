//! Triangle mesh, grounded on `src/libaspirin/mesh.cpp` in
//! `examples/original_source/`: vertex/index/uv/normal buffers, barycentric
//! `compute_surface_interaction`, and area-weighted `sample_position` via
//! `Distribution1D` over per-triangle areas.

use std::sync::Arc;

use crate::core::bsdf::Bsdf;
use crate::core::float::Float;
use crate::core::geometry::{cross3, dot3, normalize3, Bounds3f, Frame, Normal3f, Point2f, Point3f, Ray, Vector3f};
use crate::core::interaction::{PositionSample, PreliminaryIntersection, SurfaceInteraction};
use crate::core::medium::Medium;
use crate::core::sampling::{uniform_sample_triangle, Distribution1D};
use crate::core::shape::Shape;

pub struct Mesh {
    positions: Vec<Point3f>,
    normals: Vec<Normal3f>,
    uvs: Vec<Point2f>,
    indices: Vec<[u32; 3]>,
    area_distr: Distribution1D,
    surface_area: Float,
    bbox: Bounds3f,
    bsdf: Option<Arc<dyn Bsdf>>,
    interior_medium: Option<Arc<dyn Medium>>,
    exterior_medium: Option<Arc<dyn Medium>>,
}

impl Mesh {
    pub fn new(
        positions: Vec<Point3f>,
        normals: Vec<Normal3f>,
        uvs: Vec<Point2f>,
        indices: Vec<[u32; 3]>,
        bsdf: Option<Arc<dyn Bsdf>>,
    ) -> Self {
        let mut bbox = Bounds3f::empty();
        for p in &positions {
            bbox = bbox.union_point(*p);
        }
        let mut areas = Vec::with_capacity(indices.len());
        let mut surface_area = 0.0;
        for tri in &indices {
            let (p0, p1, p2) = (
                positions[tri[0] as usize],
                positions[tri[1] as usize],
                positions[tri[2] as usize],
            );
            let area = 0.5 * crate::core::geometry::length3(cross3(p1 - p0, p2 - p0));
            areas.push(area);
            surface_area += area;
        }
        let area_distr = Distribution1D::new(areas);
        Mesh {
            positions,
            normals,
            uvs,
            indices,
            area_distr,
            surface_area,
            bbox,
            bsdf,
            interior_medium: None,
            exterior_medium: None,
        }
    }

    pub fn with_media(mut self, interior: Option<Arc<dyn Medium>>, exterior: Option<Arc<dyn Medium>>) -> Self {
        self.interior_medium = interior;
        self.exterior_medium = exterior;
        self
    }

    pub fn face_count(&self) -> usize {
        self.indices.len()
    }

    fn has_vertex_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    fn has_vertex_texcoords(&self) -> bool {
        !self.uvs.is_empty()
    }

    /// Ray-triangle intersection against face `prim_index` (Möller-Trumbore),
    /// used by the reference brute-force acceleration structure since this
    /// crate carries the acceleration *interface*, not a production BVH.
    pub fn intersect_face(&self, ray: &Ray, prim_index: u32) -> Option<PreliminaryIntersection> {
        let tri = self.indices[prim_index as usize];
        let p0 = self.positions[tri[0] as usize];
        let p1 = self.positions[tri[1] as usize];
        let p2 = self.positions[tri[2] as usize];
        let e1 = p1 - p0;
        let e2 = p2 - p0;
        let pvec = crate::core::geometry::cross3(ray.d, e2);
        let det = dot3(e1, pvec);
        if det.abs() < 1e-12 {
            return None;
        }
        let inv_det = 1.0 / det;
        let tvec = ray.o - p0;
        let u = dot3(tvec, pvec) * inv_det;
        if u < 0.0 || u > 1.0 {
            return None;
        }
        let qvec = crate::core::geometry::cross3(tvec, e1);
        let v = dot3(ray.d, qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = dot3(e2, qvec) * inv_det;
        if t < ray.mint || t > ray.maxt {
            return None;
        }
        Some(PreliminaryIntersection {
            t,
            prim_index,
            uv: Point2f::new(u, v),
        })
    }
}

impl Shape for Mesh {
    fn sample_position(&self, sample: Point2f) -> PositionSample {
        let (face_idx, remapped_y, _) = self.area_distr.sample_reuse(sample.y);
        let tri = self.indices[face_idx];
        let p0 = self.positions[tri[0] as usize];
        let p1 = self.positions[tri[1] as usize];
        let p2 = self.positions[tri[2] as usize];
        let e0 = p1 - p0;
        let e1 = p2 - p0;
        let (b1, b2) = uniform_sample_triangle(Point2f::new(sample.x, remapped_y));
        let b0 = 1.0 - b1 - b2;

        let mut uv = Point2f::new(b1, b2);
        if self.has_vertex_texcoords() {
            let uv0 = self.uvs[tri[0] as usize];
            let uv1 = self.uvs[tri[1] as usize];
            let uv2 = self.uvs[tri[2] as usize];
            uv = Point2f::new(
                uv0.x * b0 + uv1.x * b1 + uv2.x * b2,
                uv0.y * b0 + uv1.y * b1 + uv2.y * b2,
            );
        }
        let ng = normalize3(cross3(e0, e1));
        let ns = if self.has_vertex_normals() {
            let n0 = Vector3f::from(self.normals[tri[0] as usize]);
            let n1 = Vector3f::from(self.normals[tri[1] as usize]);
            let n2 = Vector3f::from(self.normals[tri[2] as usize]);
            normalize3(n0 * b0 + n1 * b1 + n2 * b2)
        } else {
            ng
        };
        PositionSample {
            p: p0 + e0 * b1 + e1 * b2,
            n: Normal3f::from(ns),
            uv,
            pdf: 1.0 / self.surface_area,
            delta: false,
        }
    }

    fn pdf_position(&self, _ps: &PositionSample) -> Float {
        1.0 / self.surface_area
    }

    fn compute_surface_interaction(&self, ray: &Ray, pi: &PreliminaryIntersection) -> SurfaceInteraction {
        if !pi.is_valid() {
            return SurfaceInteraction::invalid();
        }
        let tri = self.indices[pi.prim_index as usize];
        let p0 = self.positions[tri[0] as usize];
        let p1 = self.positions[tri[1] as usize];
        let p2 = self.positions[tri[2] as usize];
        let b1 = pi.uv.x;
        let b2 = pi.uv.y;
        let b0 = 1.0 - b1 - b2;
        let p = p0 * b0 + p1 * b1 + p2 * b2;
        let ng = normalize3(cross3(p1 - p0, p2 - p0));

        let mut uv = pi.uv;
        if self.has_vertex_texcoords() {
            let uv0 = self.uvs[tri[0] as usize];
            let uv1 = self.uvs[tri[1] as usize];
            let uv2 = self.uvs[tri[2] as usize];
            uv = Point2f::new(
                uv0.x * b0 + uv1.x * b1 + uv2.x * b2,
                uv0.y * b0 + uv1.y * b1 + uv2.y * b2,
            );
        }

        let shading_n = if self.has_vertex_normals() {
            let n0 = Vector3f::from(self.normals[tri[0] as usize]);
            let n1 = Vector3f::from(self.normals[tri[1] as usize]);
            let n2 = Vector3f::from(self.normals[tri[2] as usize]);
            normalize3(n0 * b0 + n1 * b1 + n2 * b2)
        } else {
            ng
        };

        let wo = -ray.d;
        let sh_frame = Frame::new(Normal3f::from(shading_n));
        SurfaceInteraction {
            t: pi.t,
            p,
            n: Normal3f::from(ng),
            uv,
            wi: sh_frame.to_local(wo),
            sh_frame,
            prim_index: pi.prim_index,
            bsdf: self.bsdf.clone(),
            emitter: None,
            interior_medium: self.interior_medium.clone(),
            exterior_medium: self.exterior_medium.clone(),
        }
    }

    fn bbox(&self) -> Bounds3f {
        self.bbox
    }

    fn surface_area(&self) -> Float {
        self.surface_area
    }

    fn primitive_count(&self) -> usize {
        self.indices.len()
    }

    fn intersect_primitive(&self, ray: &Ray, prim_index: u32) -> Option<PreliminaryIntersection> {
        self.intersect_face(ray, prim_index)
    }

    fn bsdf(&self) -> Option<Arc<dyn Bsdf>> {
        self.bsdf.clone()
    }

    fn interior_medium(&self) -> Option<Arc<dyn Medium>> {
        self.interior_medium.clone()
    }

    fn exterior_medium(&self) -> Option<Arc<dyn Medium>> {
        self.exterior_medium.clone()
    }
}

/// Minimal Wavefront OBJ loader (`v`/`vt`/`vn`/`f`), not a general-purpose
/// parser: it exists to give the `Mesh`/`Shape` contract a real on-disk
/// producer without pulling in an external OBJ crate or the XML scene
/// pipeline spec.md keeps out of scope.
pub fn from_obj_str(text: &str, flip_tex_coords: bool, bsdf: Option<Arc<dyn Bsdf>>) -> Mesh {
    let mut positions = Vec::new();
    let mut normals_raw = Vec::new();
    let mut uvs_raw = Vec::new();

    let mut out_positions = Vec::new();
    let mut out_normals = Vec::new();
    let mut out_uvs = Vec::new();
    let mut out_indices = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        let mut it = line.split_whitespace();
        match it.next() {
            Some("v") => {
                let vals: Vec<Float> = it.filter_map(|s| s.parse().ok()).collect();
                positions.push(Point3f::new(vals[0], vals[1], vals[2]));
            }
            Some("vn") => {
                let vals: Vec<Float> = it.filter_map(|s| s.parse().ok()).collect();
                normals_raw.push(Normal3f::new(vals[0], vals[1], vals[2]));
            }
            Some("vt") => {
                let vals: Vec<Float> = it.filter_map(|s| s.parse().ok()).collect();
                let v = if flip_tex_coords { 1.0 - vals[1] } else { vals[1] };
                uvs_raw.push(Point2f::new(vals[0], v));
            }
            Some("f") => {
                let mut face_indices = Vec::new();
                for tok in it {
                    let mut parts = tok.split('/');
                    let vi: i64 = parts.next().unwrap().parse().unwrap();
                    let vi = (if vi < 0 { positions.len() as i64 + vi } else { vi - 1 }) as usize;
                    let ti = parts.next().filter(|s| !s.is_empty()).map(|s| s.parse::<i64>().unwrap());
                    let ni = parts.next().filter(|s| !s.is_empty()).map(|s| s.parse::<i64>().unwrap());

                    out_positions.push(positions[vi]);
                    if let Some(ti) = ti {
                        let idx = (if ti < 0 { uvs_raw.len() as i64 + ti } else { ti - 1 }) as usize;
                        out_uvs.push(uvs_raw[idx]);
                    }
                    if let Some(ni) = ni {
                        let idx = (if ni < 0 { normals_raw.len() as i64 + ni } else { ni - 1 }) as usize;
                        out_normals.push(normals_raw[idx]);
                    }
                    face_indices.push((out_positions.len() - 1) as u32);
                }
                for i in 1..face_indices.len() - 1 {
                    out_indices.push([face_indices[0], face_indices[i], face_indices[i + 1]]);
                }
            }
            _ => {}
        }
    }

    if !out_uvs.is_empty() && out_uvs.len() != out_positions.len() {
        out_uvs.clear();
    }
    if !out_normals.is_empty() && out_normals.len() != out_positions.len() {
        out_normals.clear();
    }

    Mesh::new(out_positions, out_normals, out_uvs, out_indices, bsdf)
}
