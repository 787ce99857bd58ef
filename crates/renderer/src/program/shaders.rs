//! GLSL sources for the GPU path.
//!
//! Every fragment program is assembled from [`HEADER`], the shared helpers in
//! [`COMMON`], a variant body defining `vec4 shade(vec2 fragCoord)` and
//! [`FOOTER`]. The bodies mirror the CPU evaluators in the sibling modules.

use crate::types::ProgramVariant;

/// Quad vertex shader. Positions arrive already in clip space.
pub(crate) const VERTEX_SHADER: &str = r"#version 450
layout(location = 0) in vec2 position;

void main() {
    gl_Position = vec4(position, 0.0, 1.0);
}
";

/// Uniform block and output declarations.
///
/// The block layout must match [`UniformBlock`](crate::uniforms::UniformBlock).
const HEADER: &str = r"#version 450
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform Params {
    vec2 _resolution;
    vec2 _pointer;
    vec2 _seed;
    float _time;
    float _intensity;
} params;

#define u_resolution params._resolution
#define u_pointer params._pointer
#define u_seed params._seed
#define u_time params._time
#define u_intensity params._intensity
";

const COMMON: &str = r"
float random(vec2 p) {
    return fract(sin(dot(p, vec2(12.9898, 78.233))) * 43758.5453);
}

float noise(vec2 p) {
    vec2 i = floor(p);
    vec2 f = fract(p);

    float a = random(i);
    float b = random(i + vec2(1.0, 0.0));
    float c = random(i + vec2(0.0, 1.0));
    float d = random(i + vec2(1.0, 1.0));

    vec2 u = f * f * (3.0 - 2.0 * f);
    return mix(a, b, u.x) + (c - a) * u.y * (1.0 - u.x) + (d - b) * u.x * u.y;
}

float fbm(vec2 p) {
    float value = 0.0;
    float amplitude = 0.5;
    for (int i = 0; i < 5; i++) {
        value += amplitude * noise(p);
        p *= 2.0;
        amplitude *= 0.5;
    }
    return value;
}

float star(vec2 p, float size, float speed, float threshold, float time) {
    vec2 grid = floor(p);
    vec2 f = fract(p) - 0.5;
    float value = random(grid);
    if (value <= threshold) {
        return 0.0;
    }
    float twinkle = sin(time * speed + value * 20.0) * 0.5 + 0.5;
    return (1.0 - smoothstep(0.0, size, length(f))) * twinkle;
}

vec2 centred(vec2 coord) {
    return (coord * 2.0 - u_resolution) / max(u_resolution.y, 1.0);
}
";

const VORTEX: &str = r"
vec4 shade(vec2 fragCoord) {
    vec2 st = centred(fragCoord);
    vec2 pointer = centred(u_pointer);

    vec2 q = vec2(fbm(st), fbm(st + 1.0));
    vec2 r = vec2(
        fbm(st + q + vec2(1.7, 9.2) + 0.15 * u_time),
        fbm(st + q + vec2(8.3, 2.8) + 0.126 * u_time)
    );
    float f = fbm(st + r);

    vec3 color = mix(vec3(0.1, 0.0, 0.4), vec3(0.9, 0.2, 0.5), clamp(f * f * 3.0, 0.0, 1.0));
    color = mix(color, vec3(0.0), clamp(length(q), 0.0, 1.0));
    color = mix(color, vec3(0.9, 1.0, 1.0), clamp(abs(r.x), 0.0, 1.0));
    color *= f * f * f + 0.6 * f * f + 0.5 * f;

    color += vec3(star(st * 30.0 + r * 2.0, 0.15, 0.5, 0.99, u_time));

    float glow = 1.0 - smoothstep(0.0, 0.15, length(st - pointer));
    color += vec3(glow * 0.5);

    return vec4(color, 1.0);
}
";

const STARRY_NIGHT: &str = r"
vec4 shade(vec2 fragCoord) {
    vec2 st = centred(fragCoord);
    float height = max(u_resolution.y, 1.0);
    float v = clamp(fragCoord.y / height, 0.0, 1.0);

    vec3 color = mix(vec3(0.06, 0.04, 0.16), vec3(0.0, 0.01, 0.05), v);

    float stars = star(st * 40.0 + u_seed, 0.12, 1.3, 0.985, u_time)
        + 0.6 * star(st * 90.0 + u_seed.yx, 0.1, 2.1, 0.99, u_time);
    color += vec3(stars);

    float drift = fbm(vec2(st.x * 1.5 + u_seed.x + u_time * 0.05, u_time * 0.1 + u_seed.y));
    float centre = 0.35 + 0.25 * drift;
    float curtain = fbm(vec2(st.x * 6.0 + u_time * 0.3, st.y * 0.5 + u_seed.y));
    float band = exp(-abs(st.y - centre) * 6.0) * (0.5 + 0.5 * curtain);
    float hue = clamp(st.y - centre + 0.5, 0.0, 1.0);
    color += mix(vec3(0.1, 0.9, 0.5), vec3(0.5, 0.2, 0.9), hue) * band * 0.8;

    float ridge = -0.55 + 0.35 * fbm(vec2(st.x * 1.3 + u_seed.x, u_seed.y));
    float land = smoothstep(ridge + 0.005, ridge - 0.005, st.y);
    color = mix(color, vec3(0.01, 0.01, 0.03), land);

    return vec4(color, 1.0);
}
";

const BLACK_HOLE: &str = r"
vec4 shade(vec2 fragCoord) {
    vec2 center = vec2(0.5, 0.5);
    vec2 uv = fragCoord / max(u_resolution, vec2(1.0));
    vec2 delta = uv - center;
    float dist = length(delta);

    float horizon = smoothstep(0.09, 0.1, dist);
    if (horizon <= 0.0) {
        return vec4(0.0);
    }

    float angle = atan(delta.y, delta.x);
    angle -= u_time * 0.3 / dist;
    angle += u_intensity * 20.0 * exp(-dist * 5.0);

    vec2 swirl = center + dist * vec2(cos(angle), sin(angle));
    float matter = random(floor(swirl * 300.0));

    float disk = smoothstep(0.1, 0.12, dist) * smoothstep(0.4, 0.2, dist);
    float clumps = pow(matter * disk, 25.0);

    vec3 color = vec3(1.0, 0.7, 0.3) * clumps * u_intensity * horizon;
    return vec4(color, sqrt(length(color)));
}
";

/// Flips the builtin top-left `gl_FragCoord` to a bottom-left origin.
const FOOTER: &str = r"
void main() {
    vec2 fragCoord = vec2(gl_FragCoord.x, u_resolution.y - gl_FragCoord.y);
    outColor = shade(fragCoord);
}
";

fn body(variant: ProgramVariant) -> &'static str {
    match variant {
        ProgramVariant::Vortex => VORTEX,
        ProgramVariant::StarryNight => STARRY_NIGHT,
        ProgramVariant::BlackHole => BLACK_HOLE,
    }
}

/// Complete GLSL 450 fragment source for `variant`.
pub(crate) fn fragment_source(variant: ProgramVariant) -> String {
    format!("{HEADER}{COMMON}{body}{FOOTER}", body = body(variant))
}
