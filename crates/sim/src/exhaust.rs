//! Exhaust puffs behind the vehicle: emission, gravity integration, retirement,
//! and the camera-facing transforms the renderer draws them with.

use engine_core::{Mat4, Vec3, ViewBasis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Hard limit on live particles. Spawns beyond it are dropped, not queued.
pub const POOL_CAPACITY: usize = 1024;
/// Particles per second while thrusting.
pub const EMISSION_RATE: f32 = 100.0;
pub const GRAVITY: Vec3 = Vec3::new(0.0, -4.0, 0.0);
/// Nozzle position in vehicle-local space (the mesh's base sits at the origin).
pub const EXHAUST_OFFSET: Vec3 = Vec3::new(0.0, -0.2, 0.0);
/// Quad edge length of a fresh particle.
pub const BASE_PARTICLE_SIZE: f32 = 0.6;
/// Size of a particle about to expire, relative to [`BASE_PARTICLE_SIZE`].
pub const MIN_SIZE_FRACTION: f32 = 0.3;

const BASE_DOWN_SPEED: f32 = 3.0;
const DOWN_SPEED_VARIANCE: f32 = 1.5;
const HORIZONTAL_SPREAD: f32 = 0.6;
const BASE_LIFE: f32 = 1.0;
const LIFE_VARIANCE: f32 = 0.5;

/// What the engine is doing this step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExhaustState {
    /// Flight running: emit new puffs.
    Firing,
    /// Flight paused: existing puffs keep fading, nothing new.
    Coasting,
    /// Vehicle parked: the pool is emptied immediately.
    AtRest,
}

/// One exhaust puff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub remaining_life: f32,
    /// Lifetime at spawn, always > 0.
    pub total_life: f32,
}

impl Particle {
    /// Remaining fraction of life in `[0, 1]`.
    pub fn life_fraction(&self) -> f32 {
        (self.remaining_life / self.total_life).clamp(0.0, 1.0)
    }

    /// Quad edge length, shrinking linearly from full size to 30% as it fades.
    pub fn size(&self) -> f32 {
        BASE_PARTICLE_SIZE * (MIN_SIZE_FRACTION + (1.0 - MIN_SIZE_FRACTION) * self.life_fraction())
    }

    /// Brightness falls off with the square of remaining life.
    pub fn intensity(&self) -> f32 {
        let f = self.life_fraction();
        f * f
    }

    /// Billboard matrix whose axes are the camera's, scaled by [`Particle::size`].
    pub fn billboard(&self, camera: &ViewBasis) -> Mat4 {
        let size = self.size();
        Mat4::from_cols(
            (camera.right * size).extend(0.0),
            (camera.up * size).extend(0.0),
            (camera.forward * size).extend(0.0),
            self.position.extend(1.0),
        )
    }
}

/// What the renderer needs per particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleInstance {
    pub transform: Mat4,
    pub intensity: f32,
}

/// Bounded, unordered set of live exhaust particles.
#[derive(Debug)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    /// Fractional spawns carried between steps.
    emission_accumulator: f32,
    rng: StdRng,
}

impl Default for ParticlePool {
    fn default() -> Self {
        Self::new()
    }
}

impl ParticlePool {
    /// Pool with an entropy-seeded generator.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Pool with a reproducible spawn sequence.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            particles: Vec::with_capacity(POOL_CAPACITY),
            emission_accumulator: 0.0,
            rng,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Drop every particle and any pending fractional emission.
    pub fn clear(&mut self) {
        self.particles.clear();
        self.emission_accumulator = 0.0;
    }

    /// Advance the pool by `dt` seconds.
    ///
    /// `vehicle` is the vehicle's world transform for *this* frame. At rest the pool
    /// is cleared outright; otherwise live particles are integrated and expired ones
    /// swap-removed, then new ones are emitted if firing.
    pub fn step(&mut self, dt: f32, vehicle: &Mat4, state: ExhaustState) {
        if state == ExhaustState::AtRest {
            if !self.particles.is_empty() {
                log::trace!("Clearing {} exhaust particles", self.particles.len());
            }
            self.clear();
            return;
        }

        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.integrate(dt);
        if state == ExhaustState::Firing {
            self.emit(dt, vehicle);
        }
    }

    fn integrate(&mut self, dt: f32) {
        let mut i = 0;
        while i < self.particles.len() {
            let p = &mut self.particles[i];
            p.velocity += GRAVITY * dt;
            p.position += p.velocity * dt;
            p.remaining_life -= dt;
            if p.remaining_life <= 0.0 {
                // Order carries no meaning, so removal is O(1).
                self.particles.swap_remove(i);
            } else {
                i += 1;
            }
        }
    }

    fn emit(&mut self, dt: f32, vehicle: &Mat4) {
        self.emission_accumulator += dt * EMISSION_RATE;
        let requested = self.emission_accumulator.floor();
        self.emission_accumulator -= requested;

        let room = POOL_CAPACITY - self.particles.len();
        let count = (requested as usize).min(room);
        if count < requested as usize {
            log::trace!("Exhaust pool full, dropping {} spawns", requested as usize - count);
        }

        let nozzle = vehicle.transform_point3(EXHAUST_OFFSET);
        for _ in 0..count {
            let particle = self.spawn(nozzle);
            self.particles.push(particle);
        }
    }

    fn spawn(&mut self, position: Vec3) -> Particle {
        let velocity = Vec3::new(
            self.rng.gen_range(-HORIZONTAL_SPREAD..=HORIZONTAL_SPREAD),
            -(BASE_DOWN_SPEED + self.rng.gen_range(0.0..=DOWN_SPEED_VARIANCE)),
            self.rng.gen_range(-HORIZONTAL_SPREAD..=HORIZONTAL_SPREAD),
        );
        let life = BASE_LIFE + self.rng.gen_range(0.0..=LIFE_VARIANCE);
        Particle {
            position,
            velocity,
            remaining_life: life,
            total_life: life,
        }
    }

    /// Per-particle transforms and intensities facing the given camera.
    pub fn instances<'a>(&'a self, camera: &'a ViewBasis) -> impl Iterator<Item = ParticleInstance> + 'a {
        self.particles.iter().map(move |p| ParticleInstance {
            transform: p.billboard(camera),
            intensity: p.intensity(),
        })
    }

    #[cfg(test)]
    fn insert(&mut self, particle: Particle) {
        self.particles.push(particle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn puff(remaining_life: f32, total_life: f32) -> Particle {
        Particle {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            remaining_life,
            total_life,
        }
    }

    #[test]
    fn fifty_milliseconds_of_thrust_spawns_five() {
        let mut pool = ParticlePool::with_seed(7);
        pool.step(0.05, &Mat4::IDENTITY, ExhaustState::Firing);
        assert_eq!(pool.len(), 5);
        for p in pool.particles() {
            assert!((BASE_LIFE..=BASE_LIFE + LIFE_VARIANCE).contains(&p.total_life));
            assert_eq!(p.remaining_life, p.total_life);
            assert!(p.velocity.y <= -BASE_DOWN_SPEED);
            assert!(p.velocity.x.abs() <= HORIZONTAL_SPREAD && p.velocity.z.abs() <= HORIZONTAL_SPREAD);
        }
    }

    #[test]
    fn spawns_at_transformed_nozzle() {
        let vehicle = Mat4::from_translation(Vec3::new(10.0, -0.5, 45.0));
        let mut pool = ParticlePool::with_seed(1);
        pool.step(0.02, &vehicle, ExhaustState::Firing);
        assert_eq!(pool.len(), 2);
        for p in pool.particles() {
            assert_eq!(p.position, Vec3::new(10.0, -0.7, 45.0));
        }
    }

    #[test]
    fn fractional_emission_carries_over() {
        let mut pool = ParticlePool::with_seed(3);
        for _ in 0..4 {
            pool.step(0.004, &Mat4::IDENTITY, ExhaustState::Firing);
        }
        // 4 × 0.4 = 1.6 spawns requested.
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn pool_never_exceeds_capacity() {
        let mut pool = ParticlePool::with_seed(11);
        pool.step(60.0, &Mat4::IDENTITY, ExhaustState::Firing);
        assert_eq!(pool.len(), POOL_CAPACITY);
        for _ in 0..10 {
            pool.step(0.5, &Mat4::IDENTITY, ExhaustState::Firing);
            assert!(pool.len() <= POOL_CAPACITY);
        }
    }

    #[test]
    fn expired_particles_are_removed_and_survivors_alive() {
        let mut pool = ParticlePool::with_seed(5);
        pool.insert(puff(0.0, 1.0));
        pool.insert(puff(-0.5, 1.0));
        pool.insert(puff(0.05, 1.0));
        pool.insert(puff(1.0, 1.2));
        pool.insert(puff(0.1, 1.0));
        pool.step(0.1, &Mat4::IDENTITY, ExhaustState::Coasting);
        assert_eq!(pool.len(), 1);
        assert!(pool.particles().iter().all(|p| p.remaining_life > 0.0));
        assert_eq!(pool.particles()[0].total_life, 1.2);
    }

    #[test]
    fn coasting_integrates_without_emitting() {
        let mut pool = ParticlePool::with_seed(9);
        pool.insert(Particle {
            position: Vec3::new(0.0, 10.0, 0.0),
            velocity: Vec3::new(1.0, 0.0, 0.0),
            remaining_life: 1.0,
            total_life: 1.0,
        });
        pool.step(0.5, &Mat4::IDENTITY, ExhaustState::Coasting);
        assert_eq!(pool.len(), 1);
        let p = pool.particles()[0];
        // Semi-implicit Euler: velocity first, then position.
        assert_eq!(p.velocity, Vec3::new(1.0, -2.0, 0.0));
        assert_eq!(p.position, Vec3::new(0.5, 9.0, 0.0));
        assert_eq!(p.remaining_life, 0.5);
    }

    #[test]
    fn at_rest_clears_everything_in_one_step() {
        let mut pool = ParticlePool::with_seed(2);
        pool.step(2.0, &Mat4::IDENTITY, ExhaustState::Firing);
        assert!(!pool.is_empty());
        pool.step(0.016, &Mat4::IDENTITY, ExhaustState::AtRest);
        assert!(pool.is_empty());
        // Accumulator reset too: a tiny step right after must not spawn leftovers.
        pool.step(0.001, &Mat4::IDENTITY, ExhaustState::Firing);
        assert!(pool.is_empty());
    }

    #[test]
    fn same_seed_same_particles() {
        let mut a = ParticlePool::with_seed(42);
        let mut b = ParticlePool::with_seed(42);
        a.step(0.1, &Mat4::IDENTITY, ExhaustState::Firing);
        b.step(0.1, &Mat4::IDENTITY, ExhaustState::Firing);
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn billboard_uses_camera_axes_and_shrinks_with_age() {
        let camera = ViewBasis::default();
        let fresh = puff(2.0, 2.0);
        let m = fresh.billboard(&camera);
        assert!((m.x_axis.truncate() - camera.right * BASE_PARTICLE_SIZE).length() < 1e-6);
        assert!((m.y_axis.truncate() - camera.up * BASE_PARTICLE_SIZE).length() < 1e-6);
        assert!((m.z_axis.truncate() - camera.forward * BASE_PARTICLE_SIZE).length() < 1e-6);

        let dying = puff(0.0, 2.0);
        assert!((dying.size() - BASE_PARTICLE_SIZE * MIN_SIZE_FRACTION).abs() < 1e-6);
        let half = puff(1.0, 2.0);
        assert!((half.size() - BASE_PARTICLE_SIZE * 0.65).abs() < 1e-6);
    }

    #[test]
    fn intensity_is_quadratic_in_life() {
        assert_eq!(puff(1.0, 1.0).intensity(), 1.0);
        assert!((puff(0.5, 1.0).intensity() - 0.25).abs() < 1e-6);
        assert_eq!(puff(0.0, 1.0).intensity(), 0.0);
    }

    #[test]
    fn instances_follow_pool_contents() {
        let mut pool = ParticlePool::with_seed(4);
        pool.step(0.03, &Mat4::IDENTITY, ExhaustState::Firing);
        let camera = ViewBasis::default();
        let instances: Vec<_> = pool.instances(&camera).collect();
        assert_eq!(instances.len(), 3);
        assert!(instances.iter().all(|i| i.intensity == 1.0));
    }
}
