//! WGSL sources for the two scene pipelines. The sky fragment evaluates the
//! same scattering model as [`crate::sky::SkyDome::radiance`]; keep the two
//! in sync when touching either.

pub(crate) const SKY_SHADER: &str = r#"
struct SkyUniform {
    inv_view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    sun_position: vec4<f32>,
    // x = turbidity, y = rayleigh, z = mie coefficient, w = mie directional g
    params: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> sky: SkyUniform;

const PI: f32 = 3.141592653589793;
const UP: vec3<f32> = vec3<f32>(0.0, 1.0, 0.0);
const TOTAL_RAYLEIGH: vec3<f32> = vec3<f32>(0.000005804543, 0.000013562911, 0.000030265903);
const MIE_CONST: vec3<f32> = vec3<f32>(183999190000000.0, 277980240000000.0, 407904800000000.0);
const RAYLEIGH_ZENITH_LENGTH: f32 = 8400.0;
const MIE_ZENITH_LENGTH: f32 = 1250.0;
const SUN_ANGULAR_DIAMETER_COS: f32 = 0.999956;
const THREE_OVER_SIXTEEN_PI: f32 = 0.059683103;
const ONE_OVER_FOUR_PI: f32 = 0.07957747;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) ray: vec3<f32>,
}

@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> VertexOutput {
    // Fullscreen triangle on the far plane.
    var out: VertexOutput;
    let pos = vec2<f32>(
        f32(i32(index) % 2) * 4.0 - 1.0,
        f32(i32(index) / 2) * 4.0 - 1.0,
    );
    out.position = vec4<f32>(pos, 1.0, 1.0);
    let world = sky.inv_view_proj * vec4<f32>(pos, 1.0, 1.0);
    out.ray = world.xyz / world.w - sky.camera_position.xyz;
    return out;
}

fn sun_intensity(zenith_cos: f32) -> f32 {
    let cutoff = PI / 1.95;
    let zenith_angle = acos(clamp(zenith_cos, -1.0, 1.0));
    return 1000.0 * max(0.0, 1.0 - exp(-((cutoff - zenith_angle) / 1.5)));
}

fn total_mie(turbidity: f32) -> vec3<f32> {
    let c = (0.2 * turbidity) * 0.00000000000000001;
    return 0.434 * c * MIE_CONST;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let direction = normalize(in.ray);
    let sun_direction = normalize(sky.sun_position.xyz);

    let sun_e = sun_intensity(dot(sun_direction, UP));
    let sun_fade = 1.0 - clamp(1.0 - exp(sky.sun_position.y / 450000.0), 0.0, 1.0);

    let beta_r = TOTAL_RAYLEIGH * (sky.params.y - (1.0 - sun_fade));
    let beta_m = total_mie(sky.params.x) * sky.params.z;

    // Optical length along the view ray, flattened near the horizon.
    let zenith_angle = acos(max(0.0, dot(UP, direction)));
    let denom = cos(zenith_angle) + 0.15 * pow(93.885 - degrees(zenith_angle), -1.253);
    let s_r = RAYLEIGH_ZENITH_LENGTH / denom;
    let s_m = MIE_ZENITH_LENGTH / denom;

    let fex = exp(-(beta_r * s_r + beta_m * s_m));

    let cos_theta = dot(direction, sun_direction);
    let r_phase = THREE_OVER_SIXTEEN_PI * (1.0 + cos_theta * cos_theta);
    let beta_r_theta = beta_r * r_phase;
    let g = sky.params.w;
    let m_phase = ONE_OVER_FOUR_PI * (1.0 - g * g)
        / pow(max(1.0 - 2.0 * g * cos_theta + g * g, 0.000001), 1.5);
    let beta_m_theta = beta_m * m_phase;

    let ratio = (beta_r_theta + beta_m_theta) / (beta_r + beta_m);
    var lin = pow(max(sun_e * ratio * (vec3<f32>(1.0) - fex), vec3<f32>(0.0)), vec3<f32>(1.5));
    let horizon_weight = clamp(pow(1.0 - dot(UP, sun_direction), 5.0), 0.0, 1.0);
    lin = lin * mix(
        vec3<f32>(1.0),
        pow(max(sun_e * ratio * fex, vec3<f32>(0.0)), vec3<f32>(0.5)),
        horizon_weight,
    );

    var l0 = vec3<f32>(0.1) * fex;
    let sun_disc = smoothstep(
        SUN_ANGULAR_DIAMETER_COS,
        SUN_ANGULAR_DIAMETER_COS + 0.00002,
        cos_theta,
    );
    l0 = l0 + sun_e * 19000.0 * fex * sun_disc;

    let tex_color = (lin + l0) * 0.04 + vec3<f32>(0.0, 0.0003, 0.00075);
    let ret_color = pow(tex_color, vec3<f32>(1.0 / (1.2 + 1.2 * sun_fade)));
    return vec4<f32>(ret_color, 1.0);
}
"#;

pub(crate) const WATER_SHADER: &str = r#"
struct WaterUniform {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
    camera_position: vec4<f32>,
    sun_direction: vec4<f32>,
    sun_color: vec4<f32>,
    water_color: vec4<f32>,
    // x = distortion scale, y = scroll speed, z = elapsed seconds, w = plane size
    params: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> water: WaterUniform;
@group(0) @binding(1)
var normal_texture: texture_2d<f32>;
@group(0) @binding(2)
var normal_sampler: sampler;
@group(0) @binding(3)
var env_texture: texture_2d<f32>;
@group(0) @binding(4)
var env_sampler: sampler;

const PI: f32 = 3.141592653589793;
const TAU: f32 = 6.283185307179586;

struct VertexInput {
    @location(0) position: vec3<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world = water.model * vec4<f32>(input.position, 1.0);
    out.world_pos = world.xyz;
    out.position = water.view_proj * world;
    return out;
}

// Four scrolled octaves of the tiling normal map.
fn get_noise(uv: vec2<f32>, t: f32) -> vec4<f32> {
    let uv0 = (uv / 103.0) + vec2<f32>(t / 17.0, t / 29.0);
    let uv1 = uv / 107.0 - vec2<f32>(t / -19.0, t / 31.0);
    let uv2 = uv / vec2<f32>(8907.0, 9803.0) + vec2<f32>(t / 101.0, t / 97.0);
    let uv3 = uv / vec2<f32>(1091.0, 1027.0) - vec2<f32>(t / 109.0, t / -113.0);
    let noise = textureSample(normal_texture, normal_sampler, uv0)
        + textureSample(normal_texture, normal_sampler, uv1)
        + textureSample(normal_texture, normal_sampler, uv2)
        + textureSample(normal_texture, normal_sampler, uv3);
    return noise * 0.5 - 1.0;
}

// Equirectangular lookup into the baked environment.
fn sample_env(direction: vec3<f32>) -> vec3<f32> {
    let d = normalize(direction);
    let u = fract(atan2(d.x, d.z) / TAU);
    let v = clamp(acos(clamp(d.y, -1.0, 1.0)) / PI, 0.0, 1.0);
    return textureSample(env_texture, env_sampler, vec2<f32>(u, v)).rgb;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let t = water.params.z * water.params.y;
    let noise = get_noise(in.world_pos.xz, t);
    let surface_normal = normalize(noise.xzy * vec3<f32>(1.5, 1.0, 1.5));

    let sun_direction = normalize(water.sun_direction.xyz);
    let to_eye = water.camera_position.xyz - in.world_pos;
    let eye_direction = normalize(to_eye);

    let sun_reflection = normalize(reflect(-sun_direction, surface_normal));
    let specular = pow(max(0.0, dot(eye_direction, sun_reflection)), 100.0) * 2.0
        * water.sun_color.rgb;
    let diffuse = max(dot(sun_direction, surface_normal), 0.0) * 0.5;

    // Reflection of the baked sky, distorted by the perturbed normal.
    let view_distance = length(to_eye);
    let distortion = surface_normal.xz
        * (0.001 + 1.0 / max(view_distance, 1.0))
        * water.params.x;
    let bent = normalize(surface_normal + vec3<f32>(distortion.x, 0.0, distortion.y));
    let mirror = reflect(-eye_direction, normalize(mix(vec3<f32>(0.0, 1.0, 0.0), bent, 0.35)));
    let reflection_sample = sample_env(mirror);

    let theta = max(dot(eye_direction, surface_normal), 0.0);
    let rf0 = 0.3;
    let reflectance = rf0 + (1.0 - rf0) * pow(1.0 - theta, 5.0);
    let scatter = theta * water.water_color.rgb;

    let albedo = mix(
        water.sun_color.rgb * diffuse * 0.3 + scatter,
        vec3<f32>(0.1) + reflection_sample * 0.9 + reflection_sample * specular,
        reflectance,
    );
    return vec4<f32>(albedo, 1.0);
}
"#;
