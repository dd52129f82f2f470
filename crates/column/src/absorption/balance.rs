use serde::Serialize;

/// Flows of one stream on a solute-free basis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StreamFlows {
    pub name: &'static str,
    pub total: f64,
    pub inert: f64,
    pub solvent: f64,
    pub solute: f64,
    /// Solute per mole of carrier (`Y` for gas, `X` for liquid).
    pub ratio: f64,
}

/// Overall solute balance of an absorber.
///
/// Gas flows are moles of inert gas, liquid flows moles of solvent; ratios
/// are moles of solute per mole of carrier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MaterialBalance {
    /// Solute moved from gas to liquid, `V·(Y_in − Y_out)`.
    pub absorbed: f64,
    /// Outlet liquid ratio, `X_in + absorbed/L`.
    pub x_out: f64,
    pub gas_in: StreamFlows,
    pub gas_out: StreamFlows,
    pub liquid_in: StreamFlows,
    pub liquid_out: StreamFlows,
}

impl MaterialBalance {
    #[must_use]
    pub fn new(y_in: f64, y_out: f64, x_in: f64, gas_rate: f64, solvent_rate: f64) -> Self {
        let absorbed = gas_rate * (y_in - y_out);
        let x_out = x_in + absorbed / solvent_rate;

        let gas = |name, ratio: f64| StreamFlows {
            name,
            total: gas_rate * (1.0 + ratio),
            inert: gas_rate,
            solvent: 0.0,
            solute: gas_rate * ratio,
            ratio,
        };
        let liquid = |name, ratio: f64| StreamFlows {
            name,
            total: solvent_rate * (1.0 + ratio),
            inert: 0.0,
            solvent: solvent_rate,
            solute: solvent_rate * ratio,
            ratio,
        };

        Self {
            absorbed,
            x_out,
            gas_in: gas("gas_in", y_in),
            gas_out: gas("gas_out", y_out),
            liquid_in: liquid("liquid_in", x_in),
            liquid_out: liquid("liquid_out", x_out),
        }
    }

    /// The four streams in the order gas in, gas out, liquid in, liquid out.
    #[must_use]
    pub fn streams(&self) -> [&StreamFlows; 4] {
        [&self.gas_in, &self.gas_out, &self.liquid_in, &self.liquid_out]
    }

    /// Solute entering minus solute leaving; zero for a closed balance.
    #[must_use]
    pub fn solute_imbalance(&self) -> f64 {
        (self.gas_in.solute + self.liquid_in.solute) - (self.gas_out.solute + self.liquid_out.solute)
    }
}
