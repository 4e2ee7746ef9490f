//! Définitions des ellipsoïdes

/// Ellipsoïde de référence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Demi-grand axe (rayon équatorial) en mètres
    pub a: f64,
    /// Aplatissement
    pub f: f64,
}

/// Ellipsoïde WGS84
pub const WGS84: Ellipsoid = Ellipsoid {
    a: 6378137.0,
    f: 1.0 / 298.257223563,
};

/// Ellipsoïde GRS80 (utilisé par Lambert 93)
/// Note: Quasi identique à WGS84, différence < 0.1mm
pub const GRS80: Ellipsoid = Ellipsoid {
    a: 6378137.0,
    f: 1.0 / 298.257222101,
};

/// GRS 1967 modifié (South American 1969)
pub const GRS67_MODIFIED: Ellipsoid = Ellipsoid {
    a: 6378160.0,
    f: 1.0 / 298.25,
};

impl Ellipsoid {
    /// Première excentricité au carré
    pub fn e2(&self) -> f64 {
        2.0 * self.f - self.f * self.f
    }

    /// Première excentricité
    pub fn e(&self) -> f64 {
        self.e2().sqrt()
    }

    /// Deuxième excentricité au carré
    pub fn ep2(&self) -> f64 {
        let e2 = self.e2();
        e2 / (1.0 - e2)
    }

    /// Grande normale (rayon de courbure dans le premier vertical)
    pub fn grande_normale(&self, lat: f64) -> f64 {
        self.a / (1.0 - self.e2() * lat.sin().powi(2)).sqrt()
    }

    /// Longueur de l'arc de méridien depuis l'équateur
    pub fn meridian_arc(&self, lat: f64) -> f64 {
        let [c0, c2, c4, c6] = self.meridian_coefficients();
        self.a
            * (c0 * lat - c2 * (2.0 * lat).sin() + c4 * (4.0 * lat).sin()
                - c6 * (6.0 * lat).sin())
    }

    /// Dérivée de l'arc de méridien par rapport à la latitude
    pub fn meridian_arc_derivative(&self, lat: f64) -> f64 {
        let [c0, c2, c4, c6] = self.meridian_coefficients();
        self.a
            * (c0 - 2.0 * c2 * (2.0 * lat).cos() + 4.0 * c4 * (4.0 * lat).cos()
                - 6.0 * c6 * (6.0 * lat).cos())
    }

    fn meridian_coefficients(&self) -> [f64; 4] {
        let e2 = self.e2();
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        [
            1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0,
            3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0,
            15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0,
            35.0 * e6 / 3072.0,
        ]
    }
}
