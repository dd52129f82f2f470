//! End-to-end absorber and distillation runs.

use approx::assert_relative_eq;
use stagewise_column::{
    Error,
    absorption::{AbsorptionColumn, AbsorptionSpec},
    distillation::{DistillationColumn, DistillationSpec, Reflux},
    economics::CostWeights,
    search::RefluxSearch,
};
use stagewise_core::{PinchMethod, Section, StageKind};

mod common;
use common::{absorber, column, henry, vle};

// =================================================================================================
// Absorption
// =================================================================================================

#[test]
fn absorber_at_one_and_a_half_minimum_solvent() {
    let equilibrium = henry();
    let absorber = AbsorptionColumn::new(absorber(), &equilibrium).unwrap();

    let report = absorber.run().unwrap();

    // V·(YF − YN)/(YF/m − X0)
    assert_relative_eq!(report.minimum.minimum, 100.0 * 0.038 / 0.098, epsilon = 1e-9);
    assert_eq!(report.minimum.method, PinchMethod::ClosedForm);
    assert_relative_eq!(report.solvent_rate, 1.5 * report.minimum.minimum, epsilon = 1e-9);

    let ideal = &report.ideal;
    assert!(ideal.converged);
    assert!(ideal.stage_count < 300);
    let ys: Vec<f64> = ideal
        .stages
        .iter()
        .filter(|record| record.kind == StageKind::Vertical)
        .map(|record| record.y)
        .collect();
    assert_eq!(ys.len(), ideal.stage_count);
    assert!(ys.windows(2).all(|pair| pair[1] > pair[0]));
    assert!(ys[ys.len() - 1] >= 0.04 - 1e-8);
}

#[test]
fn absorber_material_balance_closes() {
    let equilibrium = henry();
    let report = AbsorptionColumn::new(absorber(), &equilibrium)
        .unwrap()
        .run()
        .unwrap();

    assert_relative_eq!(report.balance.solute_imbalance(), 0.0, epsilon = 1e-9);
    assert_relative_eq!(report.packed_height, report.stages as f64 * 0.5);
}

#[test]
fn undersupplied_solvent_is_rejected_before_stepping() {
    let equilibrium = henry();
    let absorber = AbsorptionColumn::new(
        AbsorptionSpec {
            solvent_rate: Some(30.0),
            ..absorber()
        },
        &equilibrium,
    )
    .unwrap();

    match absorber.run() {
        Err(Error::InfeasibleDrivingForce {
            parameter,
            supplied,
            minimum,
        }) => {
            assert_eq!(parameter, "solvent_rate");
            assert_relative_eq!(supplied, 30.0);
            assert!(minimum > supplied);
        }
        other => panic!("expected an infeasible driving force, got {other:?}"),
    }
}

#[test]
fn leaner_gas_target_needs_more_solvent() {
    let equilibrium = henry();
    let minimum = |y_out: f64| {
        AbsorptionColumn::new(
            AbsorptionSpec {
                y_out,
                ..absorber()
            },
            &equilibrium,
        )
        .unwrap()
        .minimum_solvent()
        .unwrap()
        .minimum
    };

    assert!(minimum(0.001) > minimum(0.002));
    assert!(minimum(0.002) > minimum(0.01));
}

// =================================================================================================
// Distillation
// =================================================================================================

#[test]
fn saturated_liquid_feed_column_reaches_bottoms() {
    let equilibrium = vle();
    let distillation = DistillationColumn::new(column(), &equilibrium).unwrap();

    let report = distillation.run().unwrap();

    let pinch_y = equilibrium.value_at(0.48).unwrap();
    let slope = (pinch_y - 0.9) / (0.48 - 0.9);
    assert_relative_eq!(report.minimum.minimum, slope / (1.0 - slope), epsilon = 1e-9);
    assert!(report.minimum.minimum > 0.0);

    assert!(report.achieved);
    assert!(report.ideal.terminal_x <= 0.01 + 1e-6);
    assert_eq!(report.ideal_stages(), 8);
    assert_eq!(report.feed_stage, Some(4));
}

#[test]
fn saturated_liquid_pinch_is_direct() {
    let equilibrium = vle();
    let distillation = DistillationColumn::new(column(), &equilibrium).unwrap();

    let minimum = distillation.minimum_reflux().unwrap();

    assert_eq!(minimum.method, PinchMethod::Direct);
    assert_eq!(minimum.pinch_x, 0.48);
    assert_eq!(minimum.pinch_y, equilibrium.value_at(0.48).unwrap());
}

#[test]
fn vapour_feed_pinch_is_searched() {
    let equilibrium = vle();
    let distillation = DistillationColumn::new(
        DistillationSpec {
            q: 0.5,
            ..column()
        },
        &equilibrium,
    )
    .unwrap();

    let minimum = distillation.minimum_reflux().unwrap();

    assert_ne!(minimum.method, PinchMethod::Direct);
    // The pinch lies on the q-line y = −x + 2·xF.
    assert_relative_eq!(minimum.pinch_y, 0.96 - minimum.pinch_x, epsilon = 1e-4);
    assert!(minimum.pinch_x < 0.48);
}

#[test]
fn sections_switch_once_at_the_feed() {
    let equilibrium = vle();
    let report = DistillationColumn::new(column(), &equilibrium)
        .unwrap()
        .run()
        .unwrap();

    let sections: Vec<Section> = report
        .ideal
        .stages
        .iter()
        .filter_map(|record| record.section)
        .collect();
    let switches = sections.windows(2).filter(|pair| pair[0] != pair[1]).count();

    assert_eq!(sections.first(), Some(&Section::Rectifying));
    assert_eq!(sections.last(), Some(&Section::Stripping));
    assert_eq!(switches, 1);
}

#[test]
fn fixed_reflux_below_minimum_is_rejected() {
    let equilibrium = vle();
    let distillation = DistillationColumn::new(
        DistillationSpec {
            reflux: Reflux::Fixed(0.3),
            ..column()
        },
        &equilibrium,
    )
    .unwrap();

    assert!(matches!(
        distillation.run(),
        Err(Error::InfeasibleDrivingForce {
            parameter: "reflux",
            ..
        })
    ));
}

#[test]
fn vapour_efficiency_needs_more_real_stages() {
    let equilibrium = vle();
    let report = DistillationColumn::new(
        DistillationSpec {
            vapor_efficiency: Some(0.6),
            ..column()
        },
        &equilibrium,
    )
    .unwrap()
    .run()
    .unwrap();

    let real = report.real.as_ref().unwrap();
    assert!(report.achieved);
    assert!(real.terminal_x <= 0.01);
    assert!(real.stage_count > report.ideal_stages());
}

#[test]
fn reflux_search_and_economics_agree_with_stage_counts() {
    let equilibrium = vle();
    let distillation = DistillationColumn::new(column(), &equilibrium).unwrap();
    let r_min = distillation.minimum_reflux().unwrap().minimum;
    let target = distillation.stages_at(2.0 * r_min).unwrap();

    let found = distillation
        .reflux_for_stages(target, &RefluxSearch::default())
        .unwrap();
    assert_eq!(distillation.stages_at(found.reflux).unwrap(), target);

    let sweep = distillation.economic_sweep(&CostWeights::default()).unwrap();
    for point in &sweep.points {
        assert_eq!(point.stages, distillation.stages_at(point.reflux).unwrap());
        assert!(point.cost >= sweep.optimum.cost);
    }
}

#[test]
fn unreachable_stage_target_reports_closest_trial() {
    let equilibrium = vle();
    let distillation = DistillationColumn::new(column(), &equilibrium).unwrap();

    match distillation.reflux_for_stages(1, &RefluxSearch::default()) {
        Err(Error::InfeasibleSearch { closest, .. }) => {
            let closest = closest.unwrap();
            assert!(closest.stages > 1);
        }
        other => panic!("expected an infeasible search, got {other:?}"),
    }
}
