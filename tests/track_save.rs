// Copyright (c) 2024 Mike Tsao

use float_cmp::approx_eq;
use std::rc::Rc;
use tweenline::{orchestration::TrackSave, params::ScriptEase, prelude::*};

fn build_track(settings: &EngineSettings) -> anyhow::Result<(Rc<Timeline>, Rc<History>, Rc<Track>)> {
    let timeline = Rc::new(Timeline::default());
    let history = Rc::new(History::new_with(settings.history.clone()));
    let track = Track::new_with(
        "hero",
        timeline.clone(),
        history.clone(),
        settings.param.clone(),
    );
    Ok((timeline, history, track))
}

#[test]
fn settings_flow_into_params() -> anyhow::Result<()> {
    let settings = EngineSettings::from_json(
        r#"{"param": {"line-height": 30, "default-value": "1px"}, "history": {"max-depth": 2}}"#,
    )?;
    let (_, history, track) = build_track(&settings)?;
    let p = track.add_param(ParamOptions::named("outline-width"))?;
    assert!(approx_eq!(f64, p.height(), 30.0));
    assert_eq!(p.value()?.to_string(), "1px");

    for t in 0..5 {
        p.add_key(KeyOptions::with_value(t as f64, t), false)?;
    }
    assert_eq!(history.len(), 2);
    Ok(())
}

#[test]
fn whole_track_survives_json() -> anyhow::Result<()> {
    let (_, _, track) = build_track(&EngineSettings::default())?;
    let opacity = track.add_param(ParamOptions::named("opacity"))?;
    opacity.add_key(KeyOptions::with_value(0.0, 0.0), false)?;
    opacity.add_key(
        KeyOptions::with_value(1.0, 1.0).eased(Rc::new(tweenline::easing::Steps::new(4))),
        false,
    )?;
    let border = track.add_group("border");
    let top = border.add_param(ParamOptions::named("border-top-color"))?;
    top.add_key(KeyOptions::with_value(0.5, "red"), false)?;
    top.set_hidden(true);

    let json = track.get_save().to_json()?;
    let save = TrackSave::from_json(&json)?;

    let (_, history, copy) = build_track(&EngineSettings::default())?;
    copy.use_save(save)?;
    assert!(history.is_empty());
    assert_eq!(copy.title().0, "hero");

    let copied = copy.param("opacity").expect("loose param restored");
    for t in [0.0, 0.3, 0.6, 1.0] {
        assert_eq!(copied.value_at(t), opacity.value_at(t));
    }
    let copied_top = copy
        .group("border")
        .and_then(|g| g.param("border-top-color"))
        .expect("grouped param restored");
    assert!(copied_top.hidden());
    assert_eq!(copied_top.value_at(0.0).to_string(), "red");
    Ok(())
}

#[test]
fn export_lists_keyed_params_in_time_order() -> anyhow::Result<()> {
    let (_, _, track) = build_track(&EngineSettings::default())?;
    track.add_param(ParamOptions::named("unused"))?;
    let left = track.add_param(ParamOptions::named("left"))?;
    for (t, v) in [(4.0, "40px"), (1.0, "10px"), (2.0, "calc(1em + 2px)")] {
        left.add_key(KeyOptions::with_value(t, v), false)?;
    }

    let scripts = track.export(ExportMode::Runnable)?;
    assert_eq!(scripts.len(), 1);
    let times: Vec<f64> = scripts[0].keys.iter().map(|k| k.time).collect();
    assert_eq!(times, vec![1.0, 2.0, 4.0]);
    assert!(matches!(scripts[0].keys[0].options.ease, ScriptEase::Runnable(_)));
    assert_eq!(
        scripts[0].keys[1].options.values["left"].to_string(),
        "calc(1em + 2px)"
    );

    let json = scripts[0].to_json()?;
    assert_eq!(json["name"], "left");
    assert_eq!(json["keys"][2]["options"]["values"]["left"], "40px");
    Ok(())
}

#[test]
fn border_key_button_lights_for_any_side() -> anyhow::Result<()> {
    let (timeline, _, track) = build_track(&EngineSettings::default())?;
    let group = track.add_group("border");
    let sides = [
        "border-top-width",
        "border-right-width",
        "border-bottom-width",
        "border-left-width",
    ];
    for side in sides {
        group.add_param(ParamOptions::named(side))?;
    }
    timeline.set_curr_time(1.5);
    track
        .param("border-bottom-width")
        .expect("created above")
        .toggle_key(None)?;
    assert!(track.has_key_at(&sides, timeline.curr_time()));
    assert!(group.has_key_at(1.5));
    assert!(!track.has_key_at(&sides[..2], 1.5));
    Ok(())
}
