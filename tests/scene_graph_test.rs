use approx::assert_relative_eq;
use cgmath::{Deg, Point3, Quaternion, Rotation3, Vector3};
use vr_aquarium::{
    camera::Camera,
    data_structures::{
        bounds::Aabb,
        instance::Instance,
        scene_graph::{ContainerNode, SceneNode},
    },
};

fn translated(x: f32, y: f32, z: f32) -> Instance {
    let mut instance = Instance::new();
    instance.position = Vector3::new(x, y, z);
    instance
}

#[test]
fn world_transform_is_parent_times_local() {
    let mut parent = ContainerNode::new(1, Vec::new());
    let mut root = translated(1.0, 0.0, 0.0);
    root.rotation = Quaternion::from_angle_y(Deg(90.0));
    parent.set_local_transform(0, root);

    let mut child = ContainerNode::new(1, Vec::new());
    child.set_local_transform(0, translated(0.0, 0.0, 1.0));
    parent.add_child(Box::new(child));

    parent.update_world_transform_all();
    let world = &parent.get_children()[0].get_world_transforms()[0];
    assert_relative_eq!(world.position, Vector3::new(2.0, 0.0, 0.0), epsilon = 1e-5);
}

#[test]
fn parent_scale_and_tint_reach_the_child() {
    let mut parent = ContainerNode::new(1, Vec::new());
    parent.set_local_transform(0, Instance::new().with_uniform_scale(2.0).with_tint([1.0, 0.5, 0.5, 1.0]));
    let mut child = ContainerNode::new(1, Vec::new());
    child.set_local_transform(0, translated(0.0, 3.0, 0.0).with_tint([0.5, 1.0, 1.0, 1.0]));
    parent.add_child(Box::new(child));

    parent.update_world_transform_all();
    let world = &parent.get_children()[0].get_world_transforms()[0];
    assert_relative_eq!(world.position, Vector3::new(0.0, 6.0, 0.0), epsilon = 1e-5);
    assert_relative_eq!(world.scale, Vector3::new(2.0, 2.0, 2.0), epsilon = 1e-5);
    assert_eq!(world.tint, [0.5, 0.5, 0.5, 1.0]);
}

#[test]
fn added_instances_grow_children_from_their_first_pose() {
    let mut root = ContainerNode::new(1, Vec::new());
    let mut child = ContainerNode::new(1, Vec::new());
    child.set_local_transform(0, translated(0.0, 0.0, 5.0));
    root.add_child(Box::new(child));

    assert_eq!(root.add_instance(translated(10.0, 0.0, 0.0)), 2);
    assert_eq!(root.instance_count(), 2);
    assert_eq!(root.get_children()[0].instance_count(), 2);

    root.update_world_transform_all();
    let worlds = root.get_children()[0].get_world_transforms();
    assert_relative_eq!(worlds[0].position, Vector3::new(0.0, 0.0, 5.0), epsilon = 1e-5);
    assert_relative_eq!(worlds[1].position, Vector3::new(10.0, 0.0, 5.0), epsilon = 1e-5);
}

#[test]
fn set_all_touches_every_instance() {
    let mut node = ContainerNode::new(3, Vec::new());
    node.set_local_transform_all(&mut |local| local.position.y += 4.0);
    for idx in 0..3 {
        assert_eq!(node.get_local_transform(idx).map(|i| i.position.y), Some(4.0));
    }
    assert_eq!(node.get_local_transform(3), None);
}

#[test]
fn nodes_without_meshes_have_empty_bounds() {
    let node = ContainerNode::new(1, Vec::new());
    assert!(node.bounds().is_empty());
    assert!(node.get_render().is_empty());
}

#[test]
fn framing_looks_at_the_centre_from_above_and_front() {
    let bounds = Aabb::from_points([Point3::new(-1.0, -1.0, -1.0), Point3::new(3.0, 1.0, 1.0)]);
    let camera = Camera::framing(&bounds).expect("non-empty bounds");
    let size = bounds.size();
    assert_eq!(camera.target, Point3::new(1.0, 0.0, 0.0));
    assert_relative_eq!(
        camera.position(),
        Point3::new(1.0 + size / 3.0, size, size),
        epsilon = 1e-3
    );
    assert!(Camera::framing(&Aabb::empty()).is_none());
}
